use std::io::{stdout, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal;
use specify_core::error::Result;
use specify_core::i18n::Translator;

pub const BANNER: [&str; 6] = [
    "███████╗██████╗ ███████╗ ██████╗██╗███████╗██╗   ██╗",
    "██╔════╝██╔══██╗██╔════╝██╔════╝██║██╔════╝╚██╗ ██╔╝",
    "███████╗██████╔╝█████╗  ██║     ██║█████╗   ╚████╔╝ ",
    "╚════██║██╔═══╝ ██╔══╝  ██║     ██║██╔══╝    ╚██╔╝  ",
    "███████║██║     ███████╗╚██████╗██║██║        ██║   ",
    "╚══════╝╚═╝     ╚══════╝ ╚═════╝╚═╝╚═╝        ╚═╝   ",
];

const GRADIENT: [Color; 6] = [
    Color::Blue,
    Color::DarkBlue,
    Color::DarkCyan,
    Color::Cyan,
    Color::Grey,
    Color::White,
];

const FALLBACK_WIDTH: u16 = 80;

/// Left-pads `text` so it sits in the middle of `width` columns.
pub fn centered(text: &str, width: u16) -> String {
    let len = text.chars().count();
    let padding = (width as usize).saturating_sub(len) / 2;
    format!("{}{text}", " ".repeat(padding))
}

/// Prints the banner and the translated tagline, centered.
pub fn show_banner(translator: &Translator) -> Result<()> {
    let width = terminal::size().map_or(FALLBACK_WIDTH, |(width, _)| width);
    let mut stdout = stdout();

    for (line, color) in BANNER.iter().zip(GRADIENT.iter().cycle()) {
        queue!(
            stdout,
            SetForegroundColor(*color),
            Print(centered(line, width)),
            Print("\n")
        )?;
    }

    queue!(
        stdout,
        SetForegroundColor(Color::Yellow),
        SetAttribute(Attribute::Italic),
        Print(centered(&translator.t("tagline", &[]), width)),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(Color::Reset),
        Print("\n\n")
    )?;

    stdout.flush()?;
    Ok(())
}
