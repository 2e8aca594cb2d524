use std::io::{stdin, stdout, BufRead, Write};

use specify_core::error::Result;

/// Interprets an answer to a yes/no question. An empty answer means no;
/// anything unrecognised yields `None` so the question is asked again.
pub fn parse_confirmation(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Asks `prompt` on stdout until the user answers yes or no.
///
/// End of input counts as no.
pub fn confirm(prompt: &str) -> Result<bool> {
    let stdin = stdin();
    confirm_from(prompt, &mut stdin.lock(), &mut stdout())
}

fn confirm_from(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    loop {
        write!(output, "{prompt} [y/N]: ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        if let Some(confirmed) = parse_confirmation(&answer) {
            return Ok(confirmed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_confirmation() {
        assert_eq!(parse_confirmation("y\n"), Some(true));
        assert_eq!(parse_confirmation(" YES "), Some(true));
        assert_eq!(parse_confirmation("\n"), Some(false));
        assert_eq!(parse_confirmation("no"), Some(false));
        assert_eq!(parse_confirmation("maybe"), None);
    }

    #[test]
    fn test_confirm_asks_again_on_unclear_answer() {
        let mut input = Cursor::new("perhaps\ny\n");
        let mut output = Vec::new();

        assert!(confirm_from("Continue?", &mut input, &mut output).unwrap());
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("Continue? [y/N]: ").count(), 2);
    }

    #[test]
    fn test_confirm_end_of_input_is_no() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(!confirm_from("Continue?", &mut input, &mut output).unwrap());
    }
}
