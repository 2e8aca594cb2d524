//! The end-to-end project initialization pipeline.
//!
//! Stages run strictly in order and report into the [`StageContext`]:
//! fetch, download, extract (with its listing, summary and optional flatten
//! sub-steps), chmod, cleanup, git and final. Fetch, download and extraction
//! failures are fatal; permission and git problems are reported on their step
//! and the pipeline carries on.

use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use reqwest::blocking::Client;

use crate::config::ReleaseSource;
use crate::context::StageContext;
use crate::download::{download_archive, DownloadMetadata, TerminalProgress, TrackerProgress};
use crate::error::Result;
use crate::extract::{materialize, Destination, Materialized};
use crate::i18n::Translator;
use crate::permissions::{fix_script_permissions, PermissionReport};
use crate::release::{locate_template, TemplateVariant};
use crate::tools::Git;
use crate::tracker::Tracker;

/// Whether the git stage runs, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStep {
    /// Turned off with `--no-git`.
    Disabled,
    /// Requested but `git` is not installed.
    Unavailable,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOutcome {
    Skipped,
    ExistingRepository,
    Initialized,
    Failed,
}

#[derive(Debug, Clone)]
pub struct InitRequest {
    pub destination: Destination,
    pub variant: TemplateVariant,
    /// Directory the archive is downloaded into before extraction.
    pub download_dir: PathBuf,
    pub git: GitStep,
}

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub archive: DownloadMetadata,
    pub materialized: Materialized,
    pub permissions: PermissionReport,
    pub git: GitOutcome,
}

/// Builds the tracker for one `init` run with every step registered up
/// front. The selection steps are already complete.
pub fn prepare_tracker(translator: &Translator, variant: &TemplateVariant) -> Tracker {
    let mut tracker = Tracker::new(translator.t("project.setup_title", &[]));

    tracker.add("precheck", &translator.t("steps.precheck", &[]));
    tracker.complete("precheck", &translator.t("common.ok", &[]));
    tracker.add("ai-select", &translator.t("steps.ai_select", &[]));
    tracker.complete("ai-select", &variant.ai_assistant);
    tracker.add("script-select", &translator.t("steps.script_select", &[]));
    tracker.complete("script-select", &variant.script_type);

    for (key, label_key) in [
        ("fetch", "steps.fetch"),
        ("download", "steps.download"),
        ("extract", "steps.extract"),
        ("zip-list", "steps.zip_list"),
        ("extracted-summary", "steps.extracted_summary"),
        ("chmod", "steps.chmod"),
        ("cleanup", "steps.cleanup"),
        ("git", "steps.git_init"),
        ("final", "steps.finalize"),
    ] {
        tracker.add(key, &translator.t(label_key, &[]));
    }

    tracker
}

/// Runs the whole pipeline for `request`.
///
/// On a fatal error the `final` step is marked failed and, for a fresh
/// destination this run created, the destination is removed before the error
/// is returned. The downloaded archive never outlives the call.
///
/// # Errors
///
/// Returns the error of the first fatal stage.
pub fn init_project(
    client: &Client,
    source: &ReleaseSource,
    git: &dyn Git,
    request: &InitRequest,
    ctx: &mut StageContext,
) -> Result<InitOutcome> {
    let destination = request.destination.path();
    let existed_before = destination.exists();
    info!(
        "Initializing `{}` with template {}",
        destination.display(),
        request.variant
    );

    match run_stages(client, source, git, request, ctx) {
        Ok(outcome) => {
            let ready = ctx.t("project.ready", &[]);
            ctx.complete("final", &ready);
            Ok(outcome)
        }
        Err(e) => {
            ctx.error("final", &e.to_string());
            if request.destination.is_fresh() && !existed_before && destination.exists() {
                debug!("Removing partially created `{}`", destination.display());
                if let Err(remove_error) = fs::remove_dir_all(destination) {
                    warn!(
                        "Could not remove `{}`: {remove_error}",
                        destination.display()
                    );
                }
            }
            Err(e)
        }
    }
}

fn run_stages(
    client: &Client,
    source: &ReleaseSource,
    git: &dyn Git,
    request: &InitRequest,
    ctx: &mut StageContext,
) -> Result<InitOutcome> {
    let contacting = ctx.t("details.contacting_api", &[]);
    ctx.add("fetch", "steps.fetch");
    ctx.start("fetch", &contacting);
    let (asset, release) = report(ctx, "fetch", |ctx| {
        locate_template(client, source, &request.variant, ctx.debug)
    })?;
    let fetched = ctx.t(
        "details.release",
        &[("tag", &release.tag), ("size", &asset.size_bytes.to_string())],
    );
    ctx.complete("fetch", &fetched);

    ctx.add("download", "steps.download");
    ctx.start("download", &asset.filename);
    let downloaded = report(ctx, "download", |ctx| match ctx.tracker() {
        Some(tracker) => {
            let mut sink = TrackerProgress::new(tracker, "download");
            download_archive(client, &asset, &release.tag, &request.download_dir, &mut sink)
        }
        None => {
            let mut sink = TerminalProgress::new();
            download_archive(client, &asset, &release.tag, &request.download_dir, &mut sink)
        }
    })?;
    ctx.complete("download", &asset.filename);

    let materialized = materialize(&downloaded.path, &request.destination, ctx)?;

    let project = request.destination.path();
    let permissions = fix_script_permissions(project, ctx);
    let git = initialize_repository(git, request.git, project, ctx);

    Ok(InitOutcome {
        archive: downloaded.metadata,
        materialized,
        permissions,
        git,
    })
}

/// Runs `stage` and marks `key` failed if it errors.
fn report<T>(
    ctx: &mut StageContext,
    key: &str,
    stage: impl FnOnce(&mut StageContext) -> Result<T>,
) -> Result<T> {
    stage(&mut *ctx).inspect_err(|e| ctx.error(key, &e.to_string()))
}

fn initialize_repository(
    git: &dyn Git,
    step: GitStep,
    project: &std::path::Path,
    ctx: &mut StageContext,
) -> GitOutcome {
    match step {
        GitStep::Disabled => {
            let reason = ctx.t("git.no_git_flag", &[]);
            ctx.skip("git", &reason);
            GitOutcome::Skipped
        }
        GitStep::Unavailable => {
            let reason = ctx.t("git.not_available", &[]);
            ctx.skip("git", &reason);
            GitOutcome::Skipped
        }
        GitStep::Enabled => {
            ctx.start("git", "");
            if git.is_repo(project) {
                let detail = ctx.t("git.existing_repo", &[]);
                ctx.complete("git", &detail);
                GitOutcome::ExistingRepository
            } else if git.init_and_commit(project) {
                let detail = ctx.t("git.initialized", &[]);
                ctx.complete("git", &detail);
                GitOutcome::Initialized
            } else {
                let detail = ctx.t("git.init_failed", &[]);
                ctx.error("git", &detail);
                GitOutcome::Failed
            }
        }
    }
}
