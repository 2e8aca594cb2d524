//! Static configuration for the template pipeline.
//!
//! Repository coordinates, supported choices, timeouts and the fixed layout of
//! the extracted project live here, along with the environment overrides that
//! point the release lookup at another host or repository.

use std::time::Duration;

use indexmap::IndexMap;

use crate::i18n::Translator;

/// Default owner of the repository publishing template releases
pub const DEFAULT_REPO_OWNER: &str = "GoooIce";
/// Default repository publishing template releases
pub const DEFAULT_REPO_NAME: &str = "spec-kit";
/// Default releases API host
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Environment variable overriding the releases API host
pub const API_URL_ENV: &str = "SPECIFY_API_URL";
/// Environment variable overriding the repository, as `owner/repo`
pub const REPO_ENV: &str = "SPECIFY_REPO";

/// Prefix shared by every template asset name
pub const ASSET_PREFIX: &str = "spec-kit-template";
/// Suffix every template asset name must end with
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Hidden folder holding the template's tooling inside a project
pub const CONFIG_FOLDER: &str = ".specify";
/// Folder under [`CONFIG_FOLDER`] scanned for shell scripts
pub const SCRIPTS_FOLDER: &str = "scripts";

pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const CHUNK_SIZE: usize = 8 * 1024;

pub const USER_AGENT: &str = concat!("specify-cli/", env!("CARGO_PKG_VERSION"));

pub const AI_ASSISTANT_KEYS: [&str; 4] = ["copilot", "claude", "gemini", "cursor"];
pub const SCRIPT_TYPE_KEYS: [&str; 2] = ["sh", "ps"];
pub const LANGUAGE_KEYS: [&str; 2] = ["en", "zh"];

pub const DEFAULT_AI_ASSISTANT: &str = "copilot";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Install location used by the Claude CLI after `claude migrate-installer`
pub const CLAUDE_LOCAL_PATH: &str = "~/.claude/local/claude";

/// Script flavor matching the host platform.
pub fn default_script_type() -> &'static str {
    if cfg!(windows) {
        "ps"
    } else {
        "sh"
    }
}

/// Where the latest template release is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            owner: DEFAULT_REPO_OWNER.to_string(),
            repo: DEFAULT_REPO_NAME.to_string(),
        }
    }
}

impl ReleaseSource {
    /// Builds the source from [`API_URL_ENV`] and [`REPO_ENV`], falling back to
    /// the defaults for anything unset or malformed.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(REPO_ENV).ok(),
        )
    }

    fn from_values(api_base: Option<String>, repo: Option<String>) -> Self {
        let mut source = Self::default();

        if let Some(api_base) = api_base.filter(|value| !value.trim().is_empty()) {
            source.api_base = api_base.trim().trim_end_matches('/').to_string();
        }

        if let Some((owner, repo)) = repo.as_deref().and_then(|value| value.split_once('/')) {
            if !owner.is_empty() && !repo.is_empty() {
                source.owner = owner.to_string();
                source.repo = repo.to_string();
            }
        }

        source
    }

    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base, self.owner, self.repo
        )
    }
}

/// Expands `~` in a user supplied path.
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

/// AI assistant choices with translated descriptions, in display order.
pub fn ai_choices(translator: &Translator) -> IndexMap<String, String> {
    choices(translator, &AI_ASSISTANT_KEYS, "ai_assistants")
}

/// Script flavor choices with translated descriptions, in display order.
pub fn script_type_choices(translator: &Translator) -> IndexMap<String, String> {
    choices(translator, &SCRIPT_TYPE_KEYS, "script_types")
}

/// Language choices with translated descriptions, in display order.
pub fn language_choices(translator: &Translator) -> IndexMap<String, String> {
    choices(translator, &LANGUAGE_KEYS, "languages")
}

fn choices(translator: &Translator, keys: &[&str], section: &str) -> IndexMap<String, String> {
    keys.iter()
        .map(|key| {
            (
                (*key).to_string(),
                translator.t(&format!("{section}.{key}"), &[]),
            )
        })
        .collect()
}
