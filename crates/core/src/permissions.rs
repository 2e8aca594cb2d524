//! Restoring execute bits on template shell scripts.
//!
//! Zip archives do not reliably carry POSIX modes, so after extraction every
//! `*.sh` file under `.specify/scripts` that starts with a shebang gets the
//! execute bits matching its read bits. Owner execute is always set.

use std::path::{Path, PathBuf};

use log::warn;

use crate::config::{CONFIG_FOLDER, SCRIPTS_FOLDER};
use crate::context::StageContext;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PermissionReport {
    pub updated: usize,
    pub failures: Vec<String>,
}

impl PermissionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn scripts_root(project: &Path) -> PathBuf {
    project.join(CONFIG_FOLDER).join(SCRIPTS_FOLDER)
}

/// Execute mode for a file currently at `mode`: each read bit turns on the
/// matching execute bit, and owner execute is always on.
pub fn executable_mode(mode: u32) -> u32 {
    let mut exec = 0o100;
    if mode & 0o040 != 0 {
        exec |= 0o010;
    }
    if mode & 0o004 != 0 {
        exec |= 0o001;
    }
    mode | exec
}

/// Marks shebang scripts under the project's scripts folder executable.
///
/// Files that are symlinks, lack a `#!` prefix, or already have any execute
/// bit are left alone. Per-file failures are collected rather than returned.
#[cfg(unix)]
pub fn ensure_executable_scripts(project: &Path) -> PermissionReport {
    use std::fs::{self, File};
    use std::io::Read;
    use std::os::unix::fs::PermissionsExt;

    use log::debug;
    use walkdir::WalkDir;

    let mut report = PermissionReport::default();
    let root = scripts_root(project);
    if !root.is_dir() {
        debug!("No scripts folder at `{}`", root.display());
        return report;
    }

    for entry in WalkDir::new(&root).into_iter().filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if entry.path_is_symlink()
            || !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some("sh")
        {
            continue;
        }

        let outcome = (|| -> std::io::Result<bool> {
            let mut prefix = [0u8; 2];
            let read = File::open(path)?.read(&mut prefix)?;
            if read < 2 || &prefix != b"#!" {
                return Ok(false);
            }

            let mode = fs::metadata(path)?.permissions().mode();
            if mode & 0o111 != 0 {
                return Ok(false);
            }

            fs::set_permissions(path, fs::Permissions::from_mode(executable_mode(mode)))?;
            Ok(true)
        })();

        match outcome {
            Ok(true) => {
                debug!("Marked `{}` executable", path.display());
                report.updated += 1;
            }
            Ok(false) => {}
            Err(e) => {
                let relative = path.strip_prefix(&root).unwrap_or(path);
                report.failures.push(format!("{}: {e}", relative.display()));
            }
        }
    }

    report
}

#[cfg(not(unix))]
pub fn ensure_executable_scripts(_project: &Path) -> PermissionReport {
    PermissionReport::default()
}

/// Runs [`ensure_executable_scripts`] and reports on the `chmod` step.
///
/// Failures mark the step as an error but never abort the caller.
pub fn fix_script_permissions(project: &Path, ctx: &mut StageContext) -> PermissionReport {
    ctx.start("chmod", "");
    let report = ensure_executable_scripts(project);

    let updated = report.updated.to_string();
    if report.is_clean() {
        let detail = ctx.t("details.scripts_updated", &[("updated", &updated)]);
        ctx.complete("chmod", &detail);
    } else {
        for failure in &report.failures {
            warn!("Could not update script permissions: {failure}");
        }
        let failed = report.failures.len().to_string();
        let detail = ctx.t(
            "details.scripts_failed",
            &[("updated", &updated), ("failed", &failed)],
        );
        ctx.error("chmod", &detail);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_mode_mirrors_read_bits() {
        assert_eq!(executable_mode(0o644), 0o755);
        assert_eq!(executable_mode(0o600), 0o700);
        assert_eq!(executable_mode(0o640), 0o750);
        assert_eq!(executable_mode(0o200), 0o300);
    }

    #[test]
    fn test_missing_scripts_folder() {
        let project = tempfile::tempdir().unwrap();
        assert_eq!(
            ensure_executable_scripts(project.path()),
            PermissionReport::default()
        );
    }

    #[cfg(unix)]
    mod unix {
        use super::super::*;
        use crate::i18n::Translator;
        use crate::tracker::{StepStatus, Tracker};
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn write_with_mode(path: &Path, content: &str, mode: u32) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }

        fn mode_of(path: &Path) -> u32 {
            fs::metadata(path).unwrap().permissions().mode() & 0o777
        }

        #[test]
        fn test_only_shebang_scripts_change() {
            let project = tempfile::tempdir().unwrap();
            let root = scripts_root(project.path());
            let install = root.join("install.sh");
            let nested = root.join("bash/common.sh");
            let plain = root.join("helpers.sh");
            let notes = root.join("notes.txt");
            let done = root.join("done.sh");

            write_with_mode(&install, "#!/usr/bin/env bash\necho hi\n", 0o644);
            write_with_mode(&nested, "#!/bin/sh\n", 0o600);
            write_with_mode(&plain, "echo no shebang\n", 0o644);
            write_with_mode(&notes, "#!not a script\n", 0o644);
            write_with_mode(&done, "#!/bin/sh\n", 0o744);

            let report = ensure_executable_scripts(project.path());

            assert_eq!(report.updated, 2);
            assert!(report.is_clean());
            assert_eq!(mode_of(&install), 0o755);
            assert_eq!(mode_of(&nested), 0o700);
            assert_eq!(mode_of(&plain), 0o644);
            assert_eq!(mode_of(&notes), 0o644);
            assert_eq!(mode_of(&done), 0o744);
        }

        #[test]
        fn test_owner_only_read() {
            let project = tempfile::tempdir().unwrap();
            let install = scripts_root(project.path()).join("install.sh");
            write_with_mode(&install, "#!/bin/sh\n", 0o400);

            ensure_executable_scripts(project.path());
            assert_eq!(mode_of(&install), 0o500);
        }

        #[test]
        fn test_reports_on_chmod_step() {
            let project = tempfile::tempdir().unwrap();
            write_with_mode(
                &scripts_root(project.path()).join("setup.sh"),
                "#!/bin/sh\n",
                0o644,
            );

            let translator = Translator::new("en").unwrap();
            let mut tracker = Tracker::new("Setup");
            {
                let mut ctx = StageContext::new(Some(&mut tracker), &translator, false);
                fix_script_permissions(project.path(), &mut ctx);
            }

            let step = tracker.step("chmod").unwrap();
            assert_eq!(step.status, StepStatus::Done);
            assert_eq!(step.detail, "1 updated");
        }
    }
}
