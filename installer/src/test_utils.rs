//! Shared test utilities for the installer crate.
//!
//! Archive builders, a scripted stand-in driver, and stub implementations of
//! the transfer and sleep seams. Exposed to integration tests through the
//! `test-support` feature.

use crate::release::download::{ReleaseDownloader, TransferError};
use crate::release::fetcher::Sleeper;
use std::cell::{Cell, RefCell};
use std::io::{Cursor, Write};
use std::process::{ExitStatus, Output};
use std::time::Duration;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a command `Output` with the given exit code and stdout.
#[must_use]
pub fn output_with_stdout(code: i32, stdout: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// A shell script that behaves like a driver reporting `version`.
#[must_use]
pub fn fake_driver_script(version: &str) -> String {
    format!("#!/bin/sh\necho \"FakeDriver {version}\"\n")
}

/// Builds an in-memory zip archive of executable files.
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn zip_archive<T: AsRef<[u8]>>(files: &[(&str, T)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    // A fixed timestamp keeps the bytes, and so their digest, reproducible.
    let options = zip::write::SimpleFileOptions::default()
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o755);
    for (name, contents) in files {
        writer.start_file(*name, options.clone()).expect("start zip entry");
        writer.write_all(contents.as_ref()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Builds an in-memory gzip-compressed tarball of executable files.
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn tar_gz_archive<T: AsRef<[u8]>>(files: &[(&str, T)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    tar_into(encoder, files).finish().expect("finish gzip")
}

/// Builds an in-memory zstd-compressed tarball of executable files.
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn tar_zst_archive<T: AsRef<[u8]>>(files: &[(&str, T)]) -> Vec<u8> {
    let encoder = zstd::Encoder::new(Vec::new(), 0).expect("zstd encoder");
    tar_into(encoder, files).finish().expect("finish zstd")
}

fn tar_into<W: Write, T: AsRef<[u8]>>(writer: W, files: &[(&str, T)]) -> W {
    let mut builder = tar::Builder::new(writer);
    for (name, contents) in files {
        let contents = contents.as_ref();
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, name, contents)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar")
}

/// A [`ReleaseDownloader`] that fails a fixed number of times and then
/// serves a fixed body.
///
/// Checksum URLs (ending in `.sha256`) are answered with the SHA-256 of the
/// body and do not count as attempts.
#[derive(Debug)]
pub struct StubDownloader {
    failures_remaining: Cell<u32>,
    body: Vec<u8>,
    requested: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// A downloader that fails `failures` archive requests before serving
    /// `body`.
    #[must_use]
    pub fn new(failures: u32, body: Vec<u8>) -> Self {
        Self {
            failures_remaining: Cell::new(failures),
            body,
            requested: RefCell::new(Vec::new()),
        }
    }

    /// Archive URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }

    /// Number of archive requests so far.
    #[must_use]
    pub fn archive_requests(&self) -> usize {
        self.requested.borrow().len()
    }
}

impl ReleaseDownloader for StubDownloader {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        if url.ends_with(".sha256") {
            return Ok(crate::release::checksum::sha256_hex(&self.body).into_bytes());
        }
        self.requested.borrow_mut().push(url.to_owned());
        let remaining = self.failures_remaining.get();
        if remaining > 0 {
            self.failures_remaining.set(remaining - 1);
            return Err(TransferError::HttpError {
                url: url.to_owned(),
                reason: "connection reset by peer".to_owned(),
            });
        }
        Ok(self.body.clone())
    }
}

/// A [`Sleeper`] that records requested delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Delays requested so far, in order.
    #[must_use]
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
