//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate. Choice flags are kept as plain strings here and validated against
//! the supported keys once the translator is available.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Command-line arguments for the `specify` tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use specify_cli::cli_args::{Args, Commands};
///
/// let args = Args::parse_from(["specify", "init", "my-project", "--ai", "claude"]);
/// assert!(matches!(args.command, Commands::Init(_)));
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(
    name = "specify",
    version,
    about = "Setup tool for Specify spec-driven development projects",
    term_width = 0
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new Specify project from the latest template.
    Init(InitArgs),

    /// Check that all required tools are installed.
    Check,
}

#[derive(ClapArgs, Debug, Default, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct InitArgs {
    /// Name for your new project directory.
    ///
    /// Optional when using `--here`.
    pub project_name: Option<String>,

    /// AI assistant to use: copilot, claude, gemini or cursor.
    #[arg(long = "ai")]
    pub ai_assistant: Option<String>,

    /// Script type to use: sh or ps.
    #[arg(long = "script")]
    pub script_type: Option<String>,

    /// Template language: en or zh.
    #[arg(long = "lang")]
    pub language: Option<String>,

    /// Skip checks for AI agent tools like Claude Code.
    #[arg(long, action)]
    pub ignore_agent_tools: bool,

    /// Skip git repository initialization.
    #[arg(long, action)]
    pub no_git: bool,

    /// Initialize the project in the current directory instead of creating a new one.
    #[arg(long, action)]
    pub here: bool,

    /// Skip SSL/TLS verification (not recommended).
    #[arg(long, action)]
    pub skip_tls: bool,

    /// Show verbose diagnostic output for network and extraction failures.
    #[arg(long, action)]
    pub debug: bool,
}

impl Args {
    /// Whether debug logging was requested for this invocation.
    pub fn debug(&self) -> bool {
        match &self.command {
            Commands::Init(init) => init.debug,
            Commands::Check => false,
        }
    }
}
