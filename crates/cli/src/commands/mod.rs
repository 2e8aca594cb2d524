pub mod check;
pub mod init;

use crossterm::style::Color;
use specify_core::error::Result;
use specify_core::i18n::Translator;
use specify_core::tools::tool_available;

use crate::panels::print_colored;

/// Checks for `tool`, printing a warning and `install_hint` when it is missing.
pub fn check_tool(translator: &Translator, tool: &str, install_hint: &str) -> Result<bool> {
    if tool_available(tool) {
        return Ok(true);
    }

    print_colored(
        &translator.t("tools.not_found_template", &[("tool", tool)]),
        Color::Yellow,
        false,
    )?;
    println!(
        "   {}",
        translator.t("tools.install_with", &[("hint", install_hint)])
    );
    Ok(false)
}
