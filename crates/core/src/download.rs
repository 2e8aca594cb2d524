//! Streaming the selected asset to disk.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::http::describe_response;
use crate::release::SelectedAsset;
use crate::tracker::Tracker;

const BODY_SAMPLE_LIMIT: usize = 400;

/// Receives byte-level progress while an archive downloads.
pub trait ProgressSink {
    /// Called once before the first chunk. `total` is `None` when the server
    /// sent no content length.
    fn begin(&mut self, total: Option<u64>);

    /// Called after each chunk with the cumulative number of bytes written.
    fn advance(&mut self, written: u64);

    fn finish(&mut self);
}

/// Reports progress into the detail text of one tracker step.
///
/// The step is only touched when the visible text changes.
pub struct TrackerProgress<'a> {
    tracker: &'a mut Tracker,
    key: String,
    total: Option<u64>,
    last_detail: String,
}

impl<'a> TrackerProgress<'a> {
    pub fn new(tracker: &'a mut Tracker, key: &str) -> Self {
        Self {
            tracker,
            key: key.to_string(),
            total: None,
            last_detail: String::new(),
        }
    }
}

impl ProgressSink for TrackerProgress<'_> {
    fn begin(&mut self, total: Option<u64>) {
        self.total = total.filter(|total| *total > 0);
    }

    fn advance(&mut self, written: u64) {
        let detail = progress_detail(written, self.total);
        if detail != self.last_detail {
            self.tracker.set_detail(&self.key, &detail);
            self.last_detail = detail;
        }
    }

    fn finish(&mut self) {}
}

/// Standalone terminal progress used when no tracker is active.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn begin(&mut self, total: Option<u64>) {
        self.bar = match total.filter(|total| *total > 0) {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} Downloading... [{bar:40.cyan/blue}] {percent}%")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_message("Downloading...");
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
    }

    fn advance(&mut self, written: u64) {
        if self.bar.length().is_some() {
            self.bar.set_position(written);
        } else {
            self.bar
                .set_message(format!("Downloading... {}", format_bytes(written)));
        }
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Facts about a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadMetadata {
    pub filename: String,
    pub size: u64,
    pub release: String,
    pub asset_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub metadata: DownloadMetadata,
}

/// Streams `asset` into `download_dir`, naming the file after the asset.
///
/// The body is written in fixed-size chunks and `sink` is told the cumulative
/// byte count after every chunk. A partially written file is removed before
/// an error is returned.
///
/// # Errors
///
/// Returns [`Error::Download`] when the request fails, the status is not 200,
/// or writing the body fails.
pub fn download_archive(
    client: &Client,
    asset: &SelectedAsset,
    release_tag: &str,
    download_dir: &Path,
    sink: &mut dyn ProgressSink,
) -> Result<DownloadedArchive> {
    let archive_path = download_dir.join(&asset.filename);
    debug!(
        "Downloading `{}` to `{}`",
        asset.download_url,
        archive_path.display()
    );

    let response = client
        .get(&asset.download_url)
        .send()
        .map_err(|e| Error::download(format!("Request to {} failed: {e}", asset.download_url)))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::download(format!(
            "Download failed with {}\n{}",
            status.as_u16(),
            describe_response(response, BODY_SAMPLE_LIMIT)
        )));
    }

    sink.begin(response.content_length());
    let streamed = stream_to_file(response, &archive_path, sink);
    sink.finish();

    match streamed {
        Ok(written) => {
            debug!("Downloaded {written} bytes to `{}`", archive_path.display());
            Ok(DownloadedArchive {
                path: archive_path,
                metadata: DownloadMetadata {
                    filename: asset.filename.clone(),
                    size: asset.size_bytes,
                    release: release_tag.to_string(),
                    asset_url: asset.download_url.clone(),
                },
            })
        }
        Err(e) => {
            if archive_path.exists() {
                if let Err(remove_error) = fs::remove_file(&archive_path) {
                    debug!(
                        "Could not remove partial download `{}`: {remove_error}",
                        archive_path.display()
                    );
                }
            }
            Err(Error::download(format!(
                "Writing `{}` failed: {e}",
                archive_path.display()
            )))
        }
    }
}

fn stream_to_file(
    mut body: impl Read,
    path: &Path,
    sink: &mut dyn ProgressSink,
) -> std::io::Result<u64> {
    let mut file = File::create(path)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        file.write_all(&buffer[..read])?;
        written += read as u64;
        sink.advance(written);
    }

    file.flush()?;
    Ok(written)
}

/// Detail text for a download in progress.
pub fn progress_detail(written: u64, total: Option<u64>) -> String {
    match total {
        Some(total) => {
            let percent = written.saturating_mul(100) / total.max(1);
            format!("{}%", percent.min(100))
        }
        None => format_bytes(written),
    }
}

/// Formats a byte count in whole KiB or MiB.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB {
        format!("{}.{} MiB", bytes / MIB, (bytes % MIB) * 10 / MIB)
    } else {
        format!("{} KiB", bytes / KIB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingSink {
        total: Option<Option<u64>>,
        updates: Vec<u64>,
        finished: bool,
    }

    impl ProgressSink for RecordingSink {
        fn begin(&mut self, total: Option<u64>) {
            self.total = Some(total);
        }

        fn advance(&mut self, written: u64) {
            self.updates.push(written);
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    struct BrokenReader {
        remaining: usize,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "reset",
                ));
            }
            let n = self.remaining.min(buf.len());
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_stream_reports_cumulative_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        let data = vec![7u8; CHUNK_SIZE * 2 + 100];
        let mut sink = RecordingSink::default();

        let written = stream_to_file(Cursor::new(data.clone()), &path, &mut sink).unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(sink.updates.last().copied(), Some(data.len() as u64));
        assert!(sink.updates.windows(2).all(|w| w[0] < w[1]));
        assert!(sink.updates.iter().all(|u| *u <= data.len() as u64));
        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_stream_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        let mut sink = RecordingSink::default();

        let result = stream_to_file(BrokenReader { remaining: 100 }, &path, &mut sink);
        assert!(result.is_err());
        assert_eq!(sink.updates, vec![100]);
    }

    fn asset_at(url: String) -> SelectedAsset {
        SelectedAsset {
            filename: "template.zip".to_string(),
            download_url: url,
            size_bytes: 0,
        }
    }

    #[test]
    fn test_stalled_server_times_out() {
        use std::net::TcpListener;
        use std::thread;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(5));
            drop(stream);
        });

        let dir = tempfile::tempdir().unwrap();
        let client = crate::http::build_client_with_timeout(false, Duration::from_secs(1)).unwrap();
        let asset = asset_at(format!("http://{address}/template.zip"));
        let mut sink = RecordingSink::default();

        let started = std::time::Instant::now();
        let result = download_archive(&client, &asset, "v1", dir.path(), &mut sink);

        assert!(matches!(result, Err(Error::Download { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!dir.path().join("template.zip").exists());
        server.join().unwrap();
    }

    #[test]
    fn test_interrupted_body_removes_partial_archive() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/template.zip")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(&[1u8; 20_000])?;
                Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "connection dropped",
                ))
            })
            .create();

        let dir = tempfile::tempdir().unwrap();
        let client = crate::http::build_client(false).unwrap();
        let asset = asset_at(format!("{}/template.zip", server.url()));
        let mut sink = RecordingSink::default();

        let result = download_archive(&client, &asset, "v1", dir.path(), &mut sink);

        assert!(matches!(result, Err(Error::Download { .. })));
        assert!(!dir.path().join("template.zip").exists());
        assert!(sink.finished);
    }

    #[test]
    fn test_progress_detail() {
        assert_eq!(progress_detail(50, Some(200)), "25%");
        assert_eq!(progress_detail(250, Some(200)), "100%");
        assert_eq!(progress_detail(2048, None), "2 KiB");
        assert_eq!(progress_detail(3 * 1024 * 1024 / 2, None), "1.5 MiB");
    }

    #[test]
    fn test_tracker_progress_skips_identical_details() {
        let mut tracker = Tracker::new("Setup");
        tracker.start("download", "archive.zip");

        {
            let mut progress = TrackerProgress::new(&mut tracker, "download");
            progress.begin(Some(1000));
            progress.advance(1);
            progress.advance(2);
            assert_eq!(progress.last_detail, "0%");
            progress.advance(500);
            progress.finish();
        }

        assert_eq!(tracker.step("download").unwrap().detail, "50%");
    }

    #[test]
    fn test_tracker_progress_unknown_total() {
        let mut tracker = Tracker::new("Setup");
        {
            let mut progress = TrackerProgress::new(&mut tracker, "download");
            progress.begin(None);
            progress.advance(4096);
        }
        assert_eq!(tracker.step("download").unwrap().detail, "4 KiB");
    }
}
