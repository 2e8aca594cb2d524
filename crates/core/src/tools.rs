//! Detection of external tools and the git integration.

use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::config::{expand_path, CLAUDE_LOCAL_PATH};

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from Specify template";

/// Whether an executable called `name` is on `PATH`.
pub fn exists_on_path(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Like [`exists_on_path`], but also accepts the per-user `claude` install
/// that is not linked onto `PATH`.
pub fn tool_available(name: &str) -> bool {
    if name == "claude" && Path::new(&expand_path(CLAUDE_LOCAL_PATH)).is_file() {
        debug!("Found claude at its local install path");
        return true;
    }
    exists_on_path(name)
}

/// Repository operations performed on a freshly materialized project.
pub trait Git {
    fn is_repo(&self, path: &Path) -> bool;

    /// Initializes a repository in `path` and commits everything in it.
    /// Returns `false` if any git command fails.
    fn init_and_commit(&self, path: &Path) -> bool;
}

/// [`Git`] backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl SystemGit {
    fn run(path: &Path, args: &[&str]) -> bool {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                debug!(
                    "`git {}` failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(e) => {
                debug!("Could not run `git {}`: {e}", args.join(" "));
                false
            }
        }
    }
}

impl Git for SystemGit {
    fn is_repo(&self, path: &Path) -> bool {
        path.is_dir() && Self::run(path, &["rev-parse", "--is-inside-work-tree"])
    }

    fn init_and_commit(&self, path: &Path) -> bool {
        let steps: [&[&str]; 3] = [
            &["init"],
            &["add", "."],
            &["commit", "-m", INITIAL_COMMIT_MESSAGE],
        ];

        for args in steps {
            if !Self::run(path, args) {
                warn!("Git repository initialization failed at `git {}`", args.join(" "));
                return false;
            }
        }
        true
    }
}
