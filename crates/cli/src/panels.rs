//! Boxed text panels and the messages printed around them.

use std::io::{stdout, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use itertools::Itertools;
use specify_core::error::Result;
use specify_core::i18n::Translator;

const HORIZONTAL_PADDING: usize = 2;

fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Lays out `lines` inside a rounded box titled `title`, with one blank row
/// above and below the content.
pub fn render_panel(title: &str, lines: &[String]) -> Vec<String> {
    let content_width = lines
        .iter()
        .map(|line| display_width(line))
        .chain(std::iter::once(display_width(title) + 2))
        .max()
        .unwrap_or(0);
    let inner_width = content_width + HORIZONTAL_PADDING * 2;

    let title_segment = format!(" {title} ");
    let top = format!(
        "╭─{title_segment}{}╮",
        "─".repeat(inner_width.saturating_sub(display_width(&title_segment) + 1))
    );
    let blank = format!("│{}│", " ".repeat(inner_width));
    let bottom = format!("╰{}╯", "─".repeat(inner_width));

    let padding = " ".repeat(HORIZONTAL_PADDING);
    let body = lines.iter().map(|line| {
        let fill = " ".repeat(content_width - display_width(line));
        format!("│{padding}{line}{fill}{padding}│")
    });

    std::iter::once(top)
        .chain(std::iter::once(blank.clone()))
        .chain(body)
        .chain(std::iter::once(blank))
        .chain(std::iter::once(bottom))
        .collect_vec()
}

/// Prints a panel with its border in `color`.
pub fn print_panel(title: &str, lines: &[String], color: Color) -> Result<()> {
    let mut stdout = stdout();
    for row in render_panel(title, lines) {
        queue!(
            stdout,
            SetForegroundColor(color),
            Print(row),
            SetForegroundColor(Color::Reset),
            Print("\n")
        )?;
    }
    stdout.flush()?;
    Ok(())
}

/// Prints one line in `color`, optionally bold.
pub fn print_colored(text: &str, color: Color, bold: bool) -> Result<()> {
    let mut stdout = stdout();
    if bold {
        queue!(stdout, SetAttribute(Attribute::Bold))?;
    }
    queue!(
        stdout,
        SetForegroundColor(color),
        Print(text),
        SetForegroundColor(Color::Reset),
        SetAttribute(Attribute::Reset),
        Print("\n")
    )?;
    stdout.flush()?;
    Ok(())
}

/// Numbered "next steps" for a project set up for `ai_assistant`.
pub fn next_steps(
    translator: &Translator,
    ai_assistant: &str,
    project_name: &str,
    here: bool,
) -> Vec<String> {
    let mut lines = Vec::new();

    if here {
        lines.push(format!("1. {}", translator.t("next_steps.already_in_dir", &[])));
    } else {
        lines.push(format!(
            "1. {}",
            translator.t("next_steps.cd_project", &[("name", project_name)])
        ));
    }

    let (instructions, commands) = match ai_assistant {
        "claude" => ("next_steps.claude_instructions", Some("next_steps.claude_commands")),
        "gemini" => ("next_steps.gemini_instructions", Some("next_steps.gemini_commands")),
        "cursor" => ("next_steps.cursor_instructions", None),
        _ => ("next_steps.copilot_instructions", None),
    };

    lines.push(format!("2. {}", translator.t(instructions, &[])));
    if let Some(commands) = commands {
        lines.extend(
            translator
                .list(commands)
                .into_iter()
                .map(|command| format!("   - {command}")),
        );
    }

    lines.push(format!(
        "3. {}",
        translator.t("next_steps.update_constitution", &[])
    ));

    lines
}

/// `label → value` rows for the debug environment panel.
pub fn environment_lines() -> Vec<String> {
    let cwd = std::env::current_dir()
        .map(|cwd| cwd.display().to_string())
        .unwrap_or_else(|e| format!("<unavailable: {e}>"));

    let pairs = [
        ("Version", env!("CARGO_PKG_VERSION").to_string()),
        (
            "Platform",
            format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        ),
        ("CWD", cwd),
    ];

    let label_width = pairs.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(label, value)| format!("{label:<label_width$} → {value}"))
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_rows_share_width() {
        let rows = render_panel(
            "Next steps",
            &["1. short".to_string(), "2. a noticeably longer line".to_string()],
        );

        assert_eq!(rows.len(), 6);
        assert!(rows[0].starts_with("╭─ Next steps "));
        assert!(rows[5].starts_with('╰'));
        let width = display_width(&rows[0]);
        assert!(rows.iter().all(|row| display_width(row) == width));
        assert!(rows[2].contains("1. short"));
    }

    #[test]
    fn test_panel_wider_title_than_content() {
        let rows = render_panel("A rather long panel title", &["x".to_string()]);
        let width = display_width(&rows[0]);
        assert!(rows.iter().all(|row| display_width(row) == width));
    }

    #[test]
    fn test_next_steps_for_claude() {
        let translator = Translator::new("en").unwrap();
        let lines = next_steps(&translator, "claude", "demo", false);

        assert_eq!(lines[0], "1. Go to the project folder: cd demo");
        assert!(lines[1].starts_with("2. "));
        assert_eq!(lines[2], "   - Type / in any file to see available commands");
        assert_eq!(lines.len(), 7);
        assert!(lines[6].starts_with("3. Update CONSTITUTION.md"));
    }

    #[test]
    fn test_next_steps_here_with_copilot() {
        let translator = Translator::new("en").unwrap();
        let lines = next_steps(&translator, "copilot", "demo", true);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1. You're already in the project directory!");
        assert!(lines[1].contains("GitHub Copilot"));
    }

    #[test]
    fn test_environment_lines_are_aligned() {
        let lines = environment_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Version  → "));
        assert!(lines[2].starts_with("CWD      → "));
    }
}
