//! Interactive prompts.
//!
//! This module provides the terminal prompts used by `specify init`: an
//! arrow-key selector for the assistant, script flavor and language choices,
//! and a yes/no confirmation before merging into a non-empty directory.
//!
//! # User Interface
//!
//! The selector supports:
//! - Up/Down arrows (or vim-style j/k) to move, wrapping at either end
//! - Enter to select the highlighted option
//! - Escape or Ctrl-C to cancel

pub mod input;
pub mod types;
pub mod ui;

pub use input::confirm;
pub use types::{CycleDirection, KeyAction, SelectionState};
pub use ui::choose;
