//! HTTP transfer of release archives and checksum files.
//!
//! The [`ReleaseDownloader`] trait keeps the network behind a seam so the
//! fetcher's retry logic can be exercised without a release host.

use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for a single transfer.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches release assets by URL.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseDownloader {
    /// Download `url` and return the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::NotFound`] for HTTP 404 and
    /// [`TransferError::HttpError`] or [`TransferError::Io`] otherwise.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError>;
}

/// Download `url` through `downloader` and decode the body as UTF-8.
///
/// # Errors
///
/// As for [`ReleaseDownloader::fetch_bytes`], plus
/// [`TransferError::HttpError`] when the body is not UTF-8.
pub fn fetch_text(downloader: &dyn ReleaseDownloader, url: &str) -> Result<String, TransferError> {
    let bytes = downloader.fetch_bytes(url)?;
    String::from_utf8(bytes).map_err(|e| TransferError::HttpError {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Errors arising from a single transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The request failed or the response could not be read.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The requested URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The release host has no such asset (HTTP 404).
    #[error("release asset not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// Reading the response body failed.
    #[error("I/O error reading download: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloader backed by a shared `ureq` agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpDownloader;

impl ReleaseDownloader for HttpDownloader {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        // Driver archives can exceed ureq's default in-memory body limit.
        let mut bytes = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut bytes)?;
        log::debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}

fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(TRANSFER_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

fn map_ureq_error(url: &str, err: &ureq::Error) -> TransferError {
    match err {
        ureq::Error::StatusCode(404) => TransferError::NotFound {
            url: url.to_owned(),
        },
        other => TransferError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::missing(404, true)]
    #[case::server_error(503, false)]
    #[case::forbidden(403, false)]
    fn status_codes_map_to_transfer_errors(#[case] status: u16, #[case] not_found: bool) {
        let url = "https://host/98.0/driver.zip";
        let mapped = map_ureq_error(url, &ureq::Error::StatusCode(status));
        assert_eq!(matches!(mapped, TransferError::NotFound { .. }), not_found);
        assert!(mapped.to_string().contains(url));
    }

    #[test]
    fn fetch_text_rejects_non_utf8_bodies() {
        let mut downloader = MockReleaseDownloader::new();
        downloader
            .expect_fetch_bytes()
            .returning(|_| Ok(vec![0xff, 0xfe]));
        let err = fetch_text(&downloader, "https://host/sum")
            .expect_err("invalid UTF-8");
        assert!(matches!(err, TransferError::HttpError { .. }));
    }
}
