//! Materializing a downloaded template archive into a project directory.
//!
//! Release archives usually wrap their content in one synthetic top-level
//! folder. Both destination modes detect that wrapper and place its content
//! directly in the project:
//!
//! - [`Destination::Fresh`] extracts straight into a new directory, then
//!   flattens the wrapper by moving it into the directory's place. Any failure
//!   removes the directory again.
//! - [`Destination::Merge`] extracts into a scratch directory first and copies
//!   the effective source over the existing directory, overwriting files with
//!   the same relative path. A failed merge is not rolled back.
//!
//! The downloaded archive is deleted whatever the outcome.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::context::StageContext;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A directory that must not exist yet.
    Fresh(PathBuf),
    /// An existing, possibly non-empty directory.
    Merge(PathBuf),
}

impl Destination {
    pub fn path(&self) -> &Path {
        match self {
            Destination::Fresh(path) | Destination::Merge(path) => path,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Destination::Fresh(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Number of entries listed in the archive.
    pub entries: usize,
    /// Number of top-level items found after extraction, before flattening.
    pub top_level_items: usize,
    pub flattened: bool,
}

/// Extracts `archive` into `destination` and deletes the archive afterwards.
///
/// # Errors
///
/// Returns [`Error::Extraction`] when the archive cannot be read or the
/// filesystem work fails. A fresh destination that already exists is refused
/// without touching it.
pub fn materialize(
    archive: &Path,
    destination: &Destination,
    ctx: &mut StageContext,
) -> Result<Materialized> {
    ctx.add("extract", "steps.extract");
    ctx.start("extract", "");

    let outcome = match destination {
        Destination::Fresh(path) if path.exists() => Err(Error::extraction(
            archive.display().to_string(),
            format!("destination `{}` already exists", path.display()),
        )),
        Destination::Fresh(path) => {
            let extracted = extract_fresh(archive, path, ctx);
            if extracted.is_err() && path.exists() {
                debug!("Rolling back `{}`", path.display());
                if let Err(e) = fs::remove_dir_all(path) {
                    warn!("Could not remove `{}` after failure: {e}", path.display());
                }
            }
            extracted
        }
        Destination::Merge(path) => extract_merge(archive, path, ctx),
    };

    match &outcome {
        Ok(_) => ctx.complete("extract", ""),
        Err(e) => ctx.error("extract", &e.to_string()),
    }

    remove_archive(archive, ctx);

    outcome
}

fn failure(archive: &Path, reason: impl std::fmt::Display) -> Error {
    Error::extraction(archive.display().to_string(), reason)
}

fn remove_archive(archive: &Path, ctx: &mut StageContext) {
    ctx.add("cleanup", "steps.cleanup");
    if !archive.exists() {
        debug!("Archive `{}` is already gone", archive.display());
        ctx.complete("cleanup", "");
        return;
    }

    match fs::remove_file(archive) {
        Ok(()) => ctx.complete("cleanup", ""),
        Err(e) => {
            warn!("Could not remove `{}`: {e}", archive.display());
            ctx.error("cleanup", &e.to_string());
        }
    }
}

fn extract_fresh(archive: &Path, destination: &Path, ctx: &mut StageContext) -> Result<Materialized> {
    fs::create_dir_all(destination).map_err(|e| failure(archive, e))?;

    let entries = unpack(archive, destination, ctx)?;

    let top_level = top_level_entries(destination).map_err(|e| failure(archive, e))?;
    let summary = ctx.t(
        "details.top_level_items",
        &[("count", &top_level.len().to_string())],
    );
    ctx.start("extracted-summary", "");
    ctx.complete("extracted-summary", &summary);

    let flattened = match single_wrapper(&top_level) {
        Some(wrapper) => {
            flatten_into_place(wrapper, destination).map_err(|e| failure(archive, e))?;
            ctx.add("flatten", "steps.flatten");
            ctx.complete("flatten", "");
            true
        }
        None => false,
    };

    Ok(Materialized {
        entries,
        top_level_items: top_level.len(),
        flattened,
    })
}

fn extract_merge(archive: &Path, destination: &Path, ctx: &mut StageContext) -> Result<Materialized> {
    let scratch = tempfile::tempdir().map_err(|e| failure(archive, e))?;
    let entries = unpack(archive, scratch.path(), ctx)?;

    let top_level = top_level_entries(scratch.path()).map_err(|e| failure(archive, e))?;
    let summary = ctx.t("details.temp_items", &[("count", &top_level.len().to_string())]);
    ctx.start("extracted-summary", "");
    ctx.complete("extracted-summary", &summary);

    let source = match single_wrapper(&top_level) {
        Some(wrapper) => {
            ctx.add("flatten", "steps.flatten");
            ctx.complete("flatten", "");
            wrapper.to_path_buf()
        }
        None => scratch.path().to_path_buf(),
    };

    fs::create_dir_all(destination).map_err(|e| failure(archive, e))?;
    merge_into(&source, destination).map_err(|e| failure(archive, e))?;

    Ok(Materialized {
        entries,
        top_level_items: top_level.len(),
        flattened: source != scratch.path(),
    })
}

/// Lists and extracts every archive entry into `target`. Returns the entry count.
fn unpack(archive: &Path, target: &Path, ctx: &mut StageContext) -> Result<usize> {
    let file = File::open(archive).map_err(|e| failure(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| failure(archive, e))?;

    let entries = zip.len();
    let listed = ctx.t("details.entries", &[("count", &entries.to_string())]);
    ctx.start("zip-list", "");
    ctx.complete("zip-list", &listed);

    zip.extract(target).map_err(|e| failure(archive, e))?;
    debug!("Extracted {entries} entries into `{}`", target.display());

    Ok(entries)
}

/// Immediate children of `directory`, sorted by name.
fn top_level_entries(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(directory)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    entries.sort();
    Ok(entries)
}

/// The wrapper directory, when the top level holds exactly one directory.
fn single_wrapper(top_level: &[PathBuf]) -> Option<&Path> {
    match top_level {
        [only] if only.is_dir() => Some(only.as_path()),
        _ => None,
    }
}

/// Replaces `destination` with its only child directory `wrapper`.
fn flatten_into_place(wrapper: &Path, destination: &Path) -> std::io::Result<()> {
    let staging = sibling_staging_path(destination);
    debug!(
        "Flattening `{}` via `{}`",
        wrapper.display(),
        staging.display()
    );

    fs::rename(wrapper, &staging)?;
    fs::remove_dir(destination)?;
    fs::rename(&staging, destination)
}

fn sibling_staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());

    let mut candidate = destination.with_file_name(format!("{name}_temp"));
    let mut attempt = 1;
    while candidate.exists() {
        candidate = destination.with_file_name(format!("{name}_temp{attempt}"));
        attempt += 1;
    }
    candidate
}

/// Copies each top-level item of `source` into `destination`.
///
/// Directories that already exist are merged file by file; everything else
/// is copied whole. Existing files are overwritten.
fn merge_into(source: &Path, destination: &Path) -> std::io::Result<()> {
    for item in top_level_entries(source)? {
        let Some(name) = item.file_name() else {
            continue;
        };
        let target = destination.join(name);

        if item.is_dir() {
            if target.exists() {
                debug!("Merging directory `{}`", target.display());
                copy_files(&item, &target)?;
            } else {
                copy_tree(&item, &target)?;
            }
        } else {
            if target.exists() {
                debug!("Overwriting file `{}`", target.display());
            }
            fs::copy(&item, &target)?;
        }
    }

    Ok(())
}

/// Copies every file under `source` to the same relative path under
/// `destination`, creating parent directories as needed.
fn copy_files(source: &Path, destination: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let target = destination.join(relative_to(entry.path(), source));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
    }

    Ok(())
}

/// Copies the whole subtree, empty directories included.
fn copy_tree(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        let target = destination.join(relative_to(entry.path(), source));

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
