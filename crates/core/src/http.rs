//! HTTP client construction and failure diagnostics.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::config::{DOWNLOAD_TIMEOUT, USER_AGENT};
use crate::error::{Error, Result};

/// Builds the client shared by the release lookup and the archive download.
///
/// Redirects are followed. Connecting, waiting for the response and every
/// body read are each bounded by [`DOWNLOAD_TIMEOUT`]; a slow but steady
/// download is never cut off.
///
/// # Errors
///
/// Returns [`Error::HttpClient`] if the TLS backend cannot be initialised.
pub fn build_client(skip_tls: bool) -> Result<Client> {
    build_client_with_timeout(skip_tls, DOWNLOAD_TIMEOUT)
}

/// [`build_client`] with a custom per-operation timeout.
///
/// # Errors
///
/// Returns [`Error::HttpClient`] if the TLS backend cannot be initialised.
pub fn build_client_with_timeout(skip_tls: bool, io_timeout: Duration) -> Result<Client> {
    // The blocking client applies this to connect, response wait and each
    // read separately, never to the whole transfer.
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(io_timeout)
        .connect_timeout(io_timeout)
        .danger_accept_invalid_certs(skip_tls)
        .build()
        .map_err(|e| Error::HttpClient(e.to_string()))
}

/// Keeps the first `limit` characters of `text`.
pub fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Consumes a failed response into `Headers: ...` and `Body (truncated): ...` lines.
pub fn describe_response(response: Response, limit: usize) -> String {
    let headers = format!("{:?}", response.headers());
    let body = response.text().unwrap_or_default();
    format!(
        "Headers: {headers}\nBody (truncated {limit}): {}",
        truncate(&body, limit)
    )
}
