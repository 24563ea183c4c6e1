//! Error types for the WebDriver installer.
//!
//! Only genuinely exceptional conditions live here. The expected early exits
//! (unsupported platform, version already installed, gate denial) are
//! modelled as [`crate::orchestrator::SkipReason`] values instead.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, fetching, or installing a driver.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The required driver version could not be determined.
    #[error("cannot determine required {driver} version: {reason}")]
    Configuration {
        /// Name of the driver being installed.
        driver: String,
        /// Description of why no version could be resolved.
        reason: String,
    },

    /// The driver configuration file is missing or malformed.
    #[error("invalid driver configuration at {path}: {reason}")]
    InvalidDriverConfig {
        /// Path of the offending configuration file.
        path: Utf8PathBuf,
        /// Description of the parse or validation failure.
        reason: String,
    },

    /// Every fetch attempt for every candidate version failed.
    #[error("failed to download {driver} (v{version}) after {attempts} attempt(s): {reason}")]
    Download {
        /// Name of the driver being fetched.
        driver: String,
        /// The last candidate version that was tried.
        version: String,
        /// Number of attempts made across all candidates.
        attempts: u32,
        /// Message of the last underlying failure.
        reason: String,
    },

    /// Writing the binary into the target directory failed.
    #[error("failed to install {executable} into {bin_dir}: {reason}")]
    Installation {
        /// File name of the executable being installed.
        executable: String,
        /// Directory the executable was destined for.
        bin_dir: Utf8PathBuf,
        /// Description of the write, permission, or rename failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
