//! Specify CLI Library
//!
//! This crate provides the command-line interface for `specify`, a tool that
//! bootstraps Spec-Driven Development projects from published template
//! releases. It handles argument parsing, interactive prompts, the live
//! progress tree and the `init` and `check` commands.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`selection`]: Arrow-key selector and yes/no confirmation
//! - [`live`]: Live and static rendering of the progress tree
//! - [`panels`]: Boxed panels, colored lines and the next-steps text
//! - [`commands`]: The `init` and `check` commands
//!
//! # Examples
//!
//! ```bash
//! # Create a new project, choosing options interactively
//! specify init my-project
//!
//! # Create a Claude Code project with PowerShell scripts in Chinese
//! specify init my-project --ai claude --script ps --lang zh
//!
//! # Merge the template into the current directory, without git
//! specify init --here --no-git
//!
//! # Check which supporting tools are installed
//! specify check
//! ```

pub mod banner;
pub mod cli_args;
pub mod commands;
pub mod live;
pub mod panels;
pub mod selection;
