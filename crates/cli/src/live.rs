//! Terminal rendering of a tracker tree.
//!
//! [`LiveTree`] is attached to a [`Tracker`](specify_core::tracker::Tracker)
//! and redraws the tree in place after every change. [`write_tree`] renders a
//! single static copy.

use std::io::{self, Stdout, Write};

use crossterm::cursor;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use specify_core::tracker::{StepStatus, TrackerObserver, TreeView};

fn glyph_color(status: StepStatus) -> Color {
    match status {
        StepStatus::Done => Color::Green,
        StepStatus::Error => Color::Red,
        StepStatus::Running => Color::Cyan,
        StepStatus::Skipped => Color::Yellow,
        StepStatus::Pending => Color::DarkGrey,
    }
}

/// Writes `view` with colors. Returns the number of lines written.
pub fn write_tree(out: &mut impl Write, view: &TreeView) -> io::Result<u16> {
    queue!(
        out,
        SetForegroundColor(Color::Cyan),
        Print(&view.title),
        SetForegroundColor(Color::Reset),
        Print("\r\n")
    )?;

    for (i, line) in view.lines.iter().enumerate() {
        let guide = if i + 1 == view.lines.len() {
            "└── "
        } else {
            "├── "
        };

        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(guide),
            SetForegroundColor(glyph_color(line.status)),
            Print(line.status.glyph()),
            SetForegroundColor(Color::Reset),
            Print(" ")
        )?;

        if line.is_muted() {
            queue!(out, SetForegroundColor(Color::DarkGrey), Print(&line.label))?;
        } else {
            queue!(out, Print(&line.label))?;
        }

        if let Some(detail) = &line.detail {
            queue!(
                out,
                SetForegroundColor(Color::DarkGrey),
                Print(format!(" ({detail})"))
            )?;
        }

        queue!(
            out,
            SetForegroundColor(Color::Reset),
            SetAttribute(Attribute::Reset),
            Print("\r\n")
        )?;
    }

    Ok(u16::try_from(view.lines.len() + 1).unwrap_or(u16::MAX))
}

/// Redraws the tracker tree in place on every change.
pub struct LiveTree<W: Write> {
    out: W,
    drawn_lines: u16,
}

impl LiveTree<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LiveTree<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            drawn_lines: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrackerObserver for LiveTree<W> {
    fn on_change(&mut self, view: &TreeView) -> io::Result<()> {
        if self.drawn_lines > 0 {
            queue!(
                self.out,
                cursor::MoveToPreviousLine(self.drawn_lines),
                Clear(ClearType::FromCursorDown)
            )?;
        }

        self.drawn_lines = write_tree(&mut self.out, view)?;
        self.out.flush()
    }
}
