//! Specify Core Library
//!
//! This crate bootstraps a project from a published template release. It looks
//! up the latest release of the template repository, picks the archive for the
//! chosen AI assistant, script flavor and language, streams it to disk and
//! materializes it into a new or existing directory.
//!
//! # Key Features
//!
//! - **Release Lookup**: Query the releases API and select a matching asset
//! - **Streaming Download**: Chunked download with progress reporting
//! - **Materialization**: Fresh or merge extraction with wrapper flattening
//! - **Permission Repair**: Restore execute bits on shebang scripts
//! - **Progress Tracking**: Ordered step tracker with a pluggable observer
//! - **Localization**: English and Chinese message tables
//!
//! # Examples
//!
//! Running the pipeline without a live tracker:
//!
//! ```no_run
//! use specify_core::config::ReleaseSource;
//! use specify_core::context::StageContext;
//! use specify_core::extract::Destination;
//! use specify_core::http::build_client;
//! use specify_core::i18n::Translator;
//! use specify_core::pipeline::{init_project, GitStep, InitRequest};
//! use specify_core::release::TemplateVariant;
//! use specify_core::tools::SystemGit;
//!
//! let translator = Translator::new("en")?;
//! let client = build_client(false)?;
//! let request = InitRequest {
//!     destination: Destination::Fresh("my-project".into()),
//!     variant: TemplateVariant::new("claude", "sh", "en"),
//!     download_dir: std::env::temp_dir(),
//!     git: GitStep::Enabled,
//! };
//!
//! let mut ctx = StageContext::new(None, &translator, false);
//! init_project(&client, &ReleaseSource::from_env(), &SystemGit, &request, &mut ctx)?;
//! # Ok::<(), specify_core::error::Error>(())
//! ```

pub mod config;
pub mod context;
pub mod download;
pub mod error;
pub mod extract;
pub mod http;
pub mod i18n;
pub mod permissions;
pub mod pipeline;
pub mod release;
pub mod tools;
pub mod tracker;
