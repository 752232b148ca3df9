//! Shared test utilities for the updater crate.
//!
//! Provides an in-memory `.tar.gz` builder, a stub [`ReleaseClient`], and a
//! recording [`ProgressReporter`], so pipeline stages can be exercised without
//! network access or a terminal.
#![allow(
    clippy::missing_panics_doc,
    reason = "fixture builders panic on invalid test input"
)]

use crate::progress::ProgressReporter;
use crate::release::download::{DownloadError, ReleaseClient};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::io;
use tar::{Builder, EntryType, Header};

/// Builder for gzip-compressed tar archives held in memory.
///
/// # Panics
///
/// Every method panics if the in-memory archive cannot be written, which
/// only happens on invalid fixture input.
pub struct ArchiveFixture {
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl ArchiveFixture {
    /// Start an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    /// Append a directory entry.
    #[must_use]
    pub fn directory(mut self, path: &str) -> Self {
        let mut header = base_header(EntryType::Directory, 0o755, 0);
        self.builder
            .append_data(&mut header, path, io::empty())
            .expect("append directory entry");
        self
    }

    /// Append a regular file entry with the given mode and contents.
    #[must_use]
    pub fn file(mut self, path: &str, mode: u32, contents: &[u8]) -> Self {
        let mut header = base_header(EntryType::Regular, mode, contents.len() as u64);
        self.builder
            .append_data(&mut header, path, contents)
            .expect("append file entry");
        self
    }

    /// Append a symbolic link entry.
    #[must_use]
    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = base_header(EntryType::Symlink, 0o777, 0);
        self.builder
            .append_link(&mut header, path, target)
            .expect("append symlink entry");
        self
    }

    /// Append a hard link entry.
    #[must_use]
    pub fn hard_link(mut self, path: &str, target: &str) -> Self {
        let mut header = base_header(EntryType::Link, 0o644, 0);
        self.builder
            .append_link(&mut header, path, target)
            .expect("append hard link entry");
        self
    }

    /// Append a FIFO entry.
    #[must_use]
    pub fn fifo(mut self, path: &str) -> Self {
        let mut header = base_header(EntryType::Fifo, 0o644, 0);
        self.builder
            .append_data(&mut header, path, io::empty())
            .expect("append fifo entry");
        self
    }

    /// Append a regular file whose stored name is written byte-for-byte,
    /// bypassing the builder's path validation (e.g. `../escape`).
    #[must_use]
    pub fn raw_file(mut self, raw_name: &str, contents: &[u8]) -> Self {
        let mut header = base_header(EntryType::Regular, 0o644, contents.len() as u64);
        let name = raw_name.as_bytes();
        header
            .as_old_mut()
            .name
            .get_mut(..name.len())
            .expect("raw name fits the header")
            .copy_from_slice(name);
        header.set_cksum();
        self.builder
            .append(&header, contents)
            .expect("append raw entry");
        self
    }

    /// Finish the archive and return the compressed bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.builder
            .into_inner()
            .expect("finish tar stream")
            .finish()
            .expect("finish gzip stream")
    }
}

impl Default for ArchiveFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn base_header(entry_type: EntryType, mode: u32, size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(0);
    header
}

/// The canonical release layout used across tests: `go/bin/` holding an
/// executable `tool` whose content is `X`.
#[must_use]
pub fn minimal_release_archive() -> Vec<u8> {
    ArchiveFixture::new()
        .directory("go/")
        .directory("go/bin/")
        .file("go/bin/tool", 0o755, b"X")
        .finish()
}

/// A canned answer served by [`StubReleaseClient`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Answer with this body.
    Body(Vec<u8>),
    /// Fail with this HTTP status.
    Status(u16),
}

/// A [`ReleaseClient`] that serves canned responses and records requests.
#[derive(Debug)]
pub struct StubReleaseClient {
    latest: StubResponse,
    archive: StubResponse,
    requests: RefCell<Vec<String>>,
}

impl StubReleaseClient {
    /// Create a stub answering both requests with HTTP 404.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latest: StubResponse::Status(404),
            archive: StubResponse::Status(404),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Answer the latest-version lookup with `body`.
    #[must_use]
    pub fn with_latest(mut self, body: &str) -> Self {
        self.latest = StubResponse::Body(body.as_bytes().to_vec());
        self
    }

    /// Answer the archive download with `payload`.
    #[must_use]
    pub fn with_archive(mut self, payload: Vec<u8>) -> Self {
        self.archive = StubResponse::Body(payload);
        self
    }

    /// Fail the latest-version lookup with `status`.
    #[must_use]
    pub fn failing_latest(mut self, status: u16) -> Self {
        self.latest = StubResponse::Status(status);
        self
    }

    /// Fail the archive download with `status`.
    #[must_use]
    pub fn failing_archive(mut self, status: u16) -> Self {
        self.archive = StubResponse::Status(status);
        self
    }

    /// Return every URL requested so far, in order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn answer(&self, url: &str, response: &StubResponse) -> Result<Vec<u8>, DownloadError> {
        self.requests.borrow_mut().push(url.to_owned());
        match response {
            StubResponse::Body(body) => Ok(body.clone()),
            StubResponse::Status(status) => Err(DownloadError::HttpStatus {
                url: url.to_owned(),
                status: *status,
            }),
        }
    }
}

impl Default for StubReleaseClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseClient for StubReleaseClient {
    fn latest_version(&self, url: &str) -> Result<String, DownloadError> {
        let body = self.answer(url, &self.latest)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.answer(url, &self.archive)
    }
}

/// One call observed by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    /// `start` was called with this message.
    Start(String),
    /// `stop` was called.
    Stop,
    /// `final_message` was called with this message.
    Final(String),
}

/// A [`ProgressReporter`] that records calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    /// Calls in the order they were made.
    pub events: Vec<ReporterEvent>,
}

impl RecordingReporter {
    /// Return true when every `start` is followed by a matching `stop`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut running = false;
        for event in &self.events {
            match event {
                ReporterEvent::Start(_) if running => return false,
                ReporterEvent::Start(_) => running = true,
                ReporterEvent::Stop if !running => return false,
                ReporterEvent::Stop => running = false,
                ReporterEvent::Final(_) => {}
            }
        }
        !running
    }
}

impl ProgressReporter for RecordingReporter {
    fn start(&mut self, message: &str) {
        self.events.push(ReporterEvent::Start(message.to_owned()));
    }

    fn stop(&mut self) {
        self.events.push(ReporterEvent::Stop);
    }

    fn final_message(&mut self, message: &str) {
        self.events.push(ReporterEvent::Final(message.to_owned()));
    }
}
