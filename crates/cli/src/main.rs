use std::process::ExitCode;

use clap::Parser;
use crossterm::style::Color;
use log::debug;
use specify_core::error::{Error, Result};
use specify_core::i18n::Translator;

use specify_cli::banner::show_banner;
use specify_cli::cli_args::{Args, Commands};
use specify_cli::commands::{check::run_check, init::run_init};
use specify_cli::panels::print_colored;

const DEBUG_FILTER: &str = "specify_core=debug,specify_cli=debug,specify=debug";

fn init_logging(debug: bool) {
    let default_filter = if debug { DEBUG_FILTER } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn execute(args: &Args, translator: &mut Translator) -> Result<ExitCode> {
    show_banner(translator)?;

    match &args.command {
        Commands::Init(init_args) => run_init(init_args, translator),
        Commands::Check => run_check(translator).map(|()| ExitCode::SUCCESS),
    }
}

fn cancellation_notice(translator: &Translator, error: &Error) -> String {
    match error {
        Error::SelectionCancelled => translator.t("common.selection_cancelled", &[]),
        _ => translator.t("common.operation_cancelled", &[]),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug());
    debug!("Arguments: {args:?}");

    let mut translator = match Translator::detect() {
        Ok(translator) => translator,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&args, &mut translator) {
        Ok(code) => code,
        Err(e) if e.is_cancellation() => {
            let _ = print_colored(&cancellation_notice(&translator, &e), Color::Yellow, false);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
