use std::io::{stdout, Write};
use std::time::Duration;

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{queue, ExecutableCommand};
use indexmap::IndexMap;
use log::debug;

use super::types::{CycleDirection, KeyAction, SelectionState};
use specify_core::error::{Error, Result};

const MARKER: &str = "▶";

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Restore the terminal on every exit path
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = stdout.execute(cursor::Show);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// Maps a key press to a selector action.
pub fn key_action(key_event: &KeyEvent) -> KeyAction {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => KeyAction::Move(CycleDirection::Up),
        KeyCode::Down | KeyCode::Char('j') => KeyAction::Move(CycleDirection::Down),
        KeyCode::Enter => KeyAction::Select,
        KeyCode::Esc => KeyAction::Cancel,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Cancel
        }
        _ => KeyAction::Ignore,
    }
}

/// Row text for one option.
pub fn option_row(key: &str, description: &str, is_selected: bool) -> String {
    let marker = if is_selected { MARKER } else { " " };
    format!("  {marker}  {key}: {description}")
}

fn redraw(
    options: &IndexMap<String, String>,
    prompt: &str,
    help: &str,
    selected: usize,
) -> Result<()> {
    let mut stdout = stdout();

    queue!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(prompt),
        SetAttribute(Attribute::Reset),
        cursor::MoveToNextLine(2)
    )?;

    for (i, (key, description)) in options.iter().enumerate() {
        let is_selected = i == selected;
        if is_selected {
            queue!(stdout, SetForegroundColor(Color::Cyan))?;
        }
        queue!(
            stdout,
            Print(option_row(key, description, is_selected)),
            SetForegroundColor(Color::Reset),
            cursor::MoveToNextLine(1)
        )?;
    }

    queue!(
        stdout,
        cursor::MoveToNextLine(1),
        SetForegroundColor(Color::DarkGrey),
        Print(format!("     {help}")),
        SetForegroundColor(Color::Reset),
    )?;

    stdout.flush()?;
    Ok(())
}

/// Prompts the user to pick one of `options` with the arrow keys.
///
/// The highlight starts on `default` when it is one of the keys. Returns the
/// chosen key.
///
/// # Errors
///
/// Returns [`Error::SelectionCancelled`] on Escape or Ctrl-C, or when there is
/// nothing to choose from, and [`Error::Io`] when the terminal fails.
pub fn choose(
    options: &IndexMap<String, String>,
    prompt: &str,
    default: &str,
    help: &str,
) -> Result<String> {
    if options.is_empty() {
        debug!("Nothing to choose from for `{prompt}`");
        return Err(Error::SelectionCancelled);
    }

    let mut state = SelectionState::new(options.len(), options.get_index_of(default).unwrap_or(0));

    let mut stdout = stdout();
    stdout.execute(EnterAlternateScreen)?;
    enable_raw_mode()?;

    let _raw_mode_guard = RawModeGuard; // When this goes out of scope, raw mode is disabled
    stdout.execute(cursor::Hide)?;

    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            redraw(options, prompt, help, state.selected())?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(500))? {
            continue;
        }

        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                match key_action(&key_event) {
                    KeyAction::Move(direction) => {
                        state = state.moved(direction);
                        needs_redraw = true;
                    }
                    KeyAction::Select => {
                        return options
                            .get_index(state.selected())
                            .map(|(key, _)| key.clone())
                            .ok_or(Error::SelectionCancelled);
                    }
                    KeyAction::Cancel => return Err(Error::SelectionCancelled),
                    KeyAction::Ignore => {}
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_actions() {
        assert_eq!(
            key_action(&key(KeyCode::Up, KeyModifiers::NONE)),
            KeyAction::Move(CycleDirection::Up)
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('j'), KeyModifiers::NONE)),
            KeyAction::Move(CycleDirection::Down)
        );
        assert_eq!(
            key_action(&key(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Select
        );
        assert_eq!(
            key_action(&key(KeyCode::Esc, KeyModifiers::NONE)),
            KeyAction::Cancel
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Cancel
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('c'), KeyModifiers::NONE)),
            KeyAction::Ignore
        );
    }

    #[test]
    fn test_option_row_marks_selection() {
        assert_eq!(
            option_row("claude", "Claude Code", true),
            "  ▶  claude: Claude Code"
        );
        assert_eq!(option_row("sh", "POSIX Shell", false), "     sh: POSIX Shell");
    }

    #[test]
    fn test_empty_options_cancel() {
        let options = IndexMap::new();
        assert!(matches!(
            choose(&options, "Pick", "x", "help"),
            Err(Error::SelectionCancelled)
        ));
    }
}
