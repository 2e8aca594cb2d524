//! Locating the template asset in the latest published release.

use std::fmt::{Display, Formatter};

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{ReleaseSource, ARCHIVE_SUFFIX, ASSET_PREFIX, METADATA_TIMEOUT};
use crate::error::{Error, Result};
use crate::http::{describe_response, truncate};

const DEBUG_BODY_LIMIT: usize = 500;
const JSON_BODY_LIMIT: usize = 400;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAsset {
    pub filename: String,
    pub download_url: String,
    pub size_bytes: u64,
}

impl From<&ReleaseAsset> for SelectedAsset {
    fn from(asset: &ReleaseAsset) -> Self {
        Self {
            filename: asset.name.clone(),
            download_url: asset.download_url.clone(),
            size_bytes: asset.size,
        }
    }
}

/// The user's choices that pick one template asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariant {
    pub ai_assistant: String,
    pub script_type: String,
    pub language: String,
}

impl TemplateVariant {
    pub fn new(ai_assistant: &str, script_type: &str, language: &str) -> Self {
        Self {
            ai_assistant: ai_assistant.to_string(),
            script_type: script_type.to_string(),
            language: language.to_string(),
        }
    }

    /// Substring every matching asset name contains.
    pub fn asset_pattern(&self) -> String {
        format!(
            "{ASSET_PREFIX}-{}-{}-{}",
            self.ai_assistant, self.script_type, self.language
        )
    }
}

impl Display for TemplateVariant {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}/{}/{}",
            self.ai_assistant, self.script_type, self.language
        )
    }
}

/// Picks the first asset, in listed order, whose name contains `pattern` and
/// ends with the archive suffix.
///
/// # Errors
///
/// Returns [`Error::NoMatchingAsset`] listing every asset name when nothing matches.
pub fn select_asset(release: &ReleaseMetadata, pattern: &str) -> Result<SelectedAsset> {
    release
        .assets
        .iter()
        .find(|asset| asset.name.contains(pattern) && asset.name.ends_with(ARCHIVE_SUFFIX))
        .map(SelectedAsset::from)
        .ok_or_else(|| Error::NoMatchingAsset {
            pattern: pattern.to_string(),
            available: release.assets.iter().map(|a| a.name.clone()).collect(),
        })
}

/// Fetches the latest release of `source`.
///
/// # Errors
///
/// Returns [`Error::ReleaseFetch`] when the request fails, the status is not
/// 200, or the body is not release JSON. With `debug` set the message carries
/// the response headers and the start of the body.
pub fn fetch_latest_release(
    client: &Client,
    source: &ReleaseSource,
    debug: bool,
) -> Result<ReleaseMetadata> {
    let api_url = source.latest_release_url();
    debug!("Fetching release information from `{api_url}`");

    let response = client
        .get(&api_url)
        .timeout(METADATA_TIMEOUT)
        .send()
        .map_err(|e| Error::release_fetch(format!("Request to {api_url} failed: {e}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        let mut message = format!("GitHub API returned {} for {api_url}", status.as_u16());
        if debug {
            message.push('\n');
            message.push_str(&describe_response(response, DEBUG_BODY_LIMIT));
        }
        return Err(Error::release_fetch(message));
    }

    let body = response
        .text()
        .map_err(|e| Error::release_fetch(format!("Failed to read release response: {e}")))?;

    serde_json::from_str(&body).map_err(|e| {
        let mut message = format!("Failed to parse release JSON: {e}");
        if debug {
            message.push_str(&format!(
                "\nRaw (truncated {JSON_BODY_LIMIT}): {}",
                truncate(&body, JSON_BODY_LIMIT)
            ));
        }
        Error::release_fetch(message)
    })
}

/// Fetches the latest release and selects the asset for `variant`.
///
/// # Errors
///
/// See [`fetch_latest_release`] and [`select_asset`].
pub fn locate_template(
    client: &Client,
    source: &ReleaseSource,
    variant: &TemplateVariant,
    debug: bool,
) -> Result<(SelectedAsset, ReleaseMetadata)> {
    let release = fetch_latest_release(client, source, debug)?;
    let asset = select_asset(&release, &variant.asset_pattern())?;
    debug!(
        "Selected `{}` ({} bytes) from release {}",
        asset.filename, asset.size_bytes, release.tag
    );
    Ok((asset, release))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            download_url: format!("https://example.com/{name}"),
            size: 10,
        }
    }

    fn release(names: &[&str]) -> ReleaseMetadata {
        ReleaseMetadata {
            tag: "v0.1.0".to_string(),
            assets: names.iter().map(|name| asset(name)).collect(),
        }
    }

    #[test]
    fn test_asset_pattern() {
        let variant = TemplateVariant::new("claude", "sh", "zh");
        assert_eq!(variant.asset_pattern(), "spec-kit-template-claude-sh-zh");
        assert_eq!(variant.to_string(), "claude/sh/zh");
    }

    #[test]
    fn test_first_match_wins() {
        let release = release(&[
            "spec-kit-template-claude-sh-en-v2.zip",
            "spec-kit-template-claude-sh-en-v1.zip",
        ]);
        let selected = select_asset(&release, "spec-kit-template-claude-sh-en").unwrap();
        assert_eq!(selected.filename, "spec-kit-template-claude-sh-en-v2.zip");
        assert_eq!(
            selected.download_url,
            "https://example.com/spec-kit-template-claude-sh-en-v2.zip"
        );
        assert_eq!(selected.size_bytes, 10);
    }

    #[test]
    fn test_suffix_is_required() {
        let release = release(&[
            "spec-kit-template-claude-sh-en.tar.gz",
            "spec-kit-template-claude-sh-en.zip.sha256",
            "spec-kit-template-claude-sh-en.zip",
        ]);
        let selected = select_asset(&release, "spec-kit-template-claude-sh-en").unwrap();
        assert_eq!(selected.filename, "spec-kit-template-claude-sh-en.zip");
    }

    #[test]
    fn test_no_match_lists_all_names() {
        let release = release(&["spec-kit-template-gemini-sh-en.zip", "notes.txt"]);
        let result = select_asset(&release, "spec-kit-template-claude-sh-en");

        match result {
            Err(Error::NoMatchingAsset { pattern, available }) => {
                assert_eq!(pattern, "spec-kit-template-claude-sh-en");
                assert_eq!(
                    available,
                    vec!["spec-kit-template-gemini-sh-en.zip", "notes.txt"]
                );
            }
            _ => panic!("Expected NoMatchingAsset"),
        }
    }

    #[test]
    fn test_release_json_shape() {
        let json = r#"{
            "tag_name": "v0.0.42",
            "name": "ignored",
            "assets": [
                {"name": "a.zip", "browser_download_url": "https://x/a.zip", "size": 123, "id": 1}
            ]
        }"#;
        let release: ReleaseMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag, "v0.0.42");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].download_url, "https://x/a.zip");
        assert_eq!(release.assets[0].size, 123);
    }

    #[test]
    fn test_release_without_assets() {
        let release: ReleaseMetadata = serde_json::from_str(r#"{"tag_name": "v1"}"#).unwrap();
        assert!(release.assets.is_empty());
    }
}
