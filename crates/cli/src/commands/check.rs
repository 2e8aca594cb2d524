//! `specify check`: report which supporting tools are installed.

use crossterm::style::{Attribute, Color, Print, SetAttribute};
use crossterm::execute;
use specify_core::error::Result;
use specify_core::i18n::Translator;
use specify_core::tools::tool_available;
use specify_core::tracker::Tracker;

use crate::live::write_tree;
use crate::panels::print_colored;

/// Tools reported by `specify check`: tracker key, label key, executables
/// tried in order, and where to get it.
pub const CHECKED_TOOLS: [(&str, &str, &[&str], &str); 5] = [
    ("git", "tools.git", &["git"], "https://git-scm.com/downloads"),
    (
        "claude",
        "tools.claude",
        &["claude"],
        "https://docs.anthropic.com/en/docs/claude-code/setup",
    ),
    (
        "gemini",
        "tools.gemini",
        &["gemini"],
        "https://github.com/google-gemini/gemini-cli",
    ),
    (
        "code",
        "tools.code",
        &["code", "code-insiders"],
        "https://code.visualstudio.com/",
    ),
    (
        "cursor-agent",
        "tools.cursor_agent",
        &["cursor-agent"],
        "https://cursor.sh/",
    ),
];

/// Outcome of checking every tool in [`CHECKED_TOOLS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub found: Vec<(String, bool)>,
}

impl ToolReport {
    pub fn has(&self, key: &str) -> bool {
        self.found
            .iter()
            .any(|(tool, present)| tool == key && *present)
    }

    /// Tips to print after the tree.
    pub fn tip_keys(&self) -> Vec<&'static str> {
        let mut tips = Vec::new();
        if !self.has("git") {
            tips.push("summary.install_git_tip");
        }
        if !(self.has("claude") || self.has("gemini")) {
            tips.push("summary.install_ai_tip");
        }
        tips
    }
}

/// Fills `tracker` with one step per tool, using `is_available` to probe
/// executables.
pub fn check_tools(
    translator: &Translator,
    tracker: &mut Tracker,
    is_available: impl Fn(&str) -> bool,
) -> ToolReport {
    for (key, label_key, _, _) in CHECKED_TOOLS {
        tracker.add(key, &translator.t(label_key, &[]));
    }

    let found = CHECKED_TOOLS
        .iter()
        .map(|(key, _, executables, hint)| {
            match executables.iter().find(|name| is_available(name)) {
                Some(name) if name == key => {
                    tracker.complete(key, &translator.t("common.available", &[]));
                    ((*key).to_string(), true)
                }
                Some(name) => {
                    let detail = format!("{} ({name})", translator.t("common.available", &[]));
                    tracker.complete(key, &detail);
                    ((*key).to_string(), true)
                }
                None => {
                    let detail = format!("{} - {hint}", translator.t("common.not_found", &[]));
                    tracker.error(key, &detail);
                    ((*key).to_string(), false)
                }
            }
        })
        .collect();

    ToolReport { found }
}

pub fn run_check(translator: &Translator) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        SetAttribute(Attribute::Bold),
        Print(translator.t("tools.checking", &[])),
        SetAttribute(Attribute::Reset),
        Print("\n\n")
    )?;

    let mut tracker = Tracker::new(translator.t("tools.check_title", &[]));
    let report = check_tools(translator, &mut tracker, tool_available);

    write_tree(&mut stdout, &tracker.render())?;
    println!();
    print_colored(&translator.t("summary.specify_ready", &[]), Color::Green, true)?;

    for tip in report.tip_keys() {
        print_colored(&translator.t(tip, &[]), Color::DarkGrey, false)?;
    }

    Ok(())
}
