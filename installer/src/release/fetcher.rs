//! Bounded, sequential retrieval of a driver release.
//!
//! [`ReleaseFetcher`] walks the candidate versions in order and gives each
//! up to `max_attempts` tries. Any failure inside an attempt (transfer,
//! checksum, or a corrupt archive) is retried after a linear backoff; the
//! first decoded package wins.

use super::checksum::{self, ChecksumError};
use super::download::{ReleaseDownloader, TransferError, fetch_text};
use super::extraction::{self, ArchiveFormat, ExtractionError};
use super::package::{Package, Release, ReleaseLocator};
use crate::config::DriverConfig;
use crate::error::{InstallerError, Result};
use crate::platform::Platform;
use crate::version::VersionSpec;
use log::debug;
use std::time::Duration;

/// Base delay between attempts; attempt `n` waits `n` times this.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Produces a decoded [`Package`] for one of several candidate versions.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Fetch the first candidate that can be downloaded.
    ///
    /// A `max_attempts` of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Download`] carrying the last failure when
    /// every attempt of every candidate fails, or when `candidates` is
    /// empty.
    fn download_release(&self, candidates: &[VersionSpec], max_attempts: u32) -> Result<Package>;
}

/// Waits between attempts.
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper {
    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Why a single attempt failed.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// [`ReleaseSource`] backed by a [`ReleaseDownloader`].
pub struct ReleaseFetcher<'a> {
    driver: &'a str,
    raw_name: String,
    locator: Option<ReleaseLocator<'a>>,
    downloader: &'a dyn ReleaseDownloader,
    sleeper: &'a dyn Sleeper,
    backoff: Duration,
}

impl<'a> ReleaseFetcher<'a> {
    /// A fetcher for `config` on `platform` with the default backoff.
    #[must_use]
    pub fn new(
        config: &'a DriverConfig,
        platform: &Platform,
        downloader: &'a dyn ReleaseDownloader,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            driver: &config.name,
            raw_name: config.executable_name(platform),
            locator: ReleaseLocator::new(config, platform),
            downloader,
            sleeper,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Replace the base backoff delay.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn attempt(&self, release: Release) -> std::result::Result<Package, AttemptError> {
        let bytes = self.downloader.fetch_bytes(&release.url)?;
        if let Some(checksum_url) = release.checksum_url.as_deref() {
            let published = fetch_text(self.downloader, checksum_url)?;
            checksum::verify(&bytes, &published)?;
            debug!("checksum of {} verified", release.url);
        }
        let announced = ArchiveFormat::from_url(&release.url);
        let (format, entries) = extraction::decode(&bytes, &self.raw_name, announced)?;
        Ok(Package {
            release,
            format,
            entries,
        })
    }

    fn download_error(&self, version: &str, attempts: u32, reason: String) -> InstallerError {
        InstallerError::Download {
            driver: self.driver.to_owned(),
            version: version.to_owned(),
            attempts,
            reason,
        }
    }
}

impl ReleaseSource for ReleaseFetcher<'_> {
    fn download_release(&self, candidates: &[VersionSpec], max_attempts: u32) -> Result<Package> {
        let Some(last_candidate) = candidates.last() else {
            return Err(self.download_error("", 0, "no candidate versions".to_owned()));
        };
        let Some(locator) = self.locator.as_ref() else {
            return Err(self.download_error(
                last_candidate.as_str(),
                0,
                "the release host does not serve this platform".to_owned(),
            ));
        };

        let max_attempts = max_attempts.max(1);
        let mut attempts_made = 0;
        let mut last_error = String::new();

        for candidate in candidates {
            for attempt in 1..=max_attempts {
                attempts_made += 1;
                let release = locator.locate(candidate);
                debug!(
                    "fetching {} v{candidate} from {} (attempt {attempt}/{max_attempts})",
                    self.driver, release.url
                );
                match self.attempt(release) {
                    Ok(package) => return Ok(package),
                    Err(e) => {
                        debug!("attempt {attempt} for {} v{candidate} failed: {e}", self.driver);
                        last_error = e.to_string();
                    }
                }
                // Moving on to the next candidate happens without a pause.
                if attempt < max_attempts {
                    self.sleeper.sleep(self.backoff * attempt);
                }
            }
        }

        Err(self.download_error(last_candidate.as_str(), attempts_made, last_error))
    }
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;
