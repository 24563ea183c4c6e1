//! Optional SHA-256 verification of downloaded archives.
//!
//! Checksum files come in the `sha256sum` layout (`<hex>  <file name>`) or as
//! a bare digest; only the first whitespace-separated token is read.

use sha2::{Digest, Sha256};

const DIGEST_HEX_LEN: usize = 64;

/// Errors arising from checksum verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecksumError {
    /// The checksum file does not start with a SHA-256 hex digest.
    #[error("malformed checksum file: {reason}")]
    Malformed {
        /// What is wrong with the file.
        reason: String,
    },

    /// The archive does not hash to the published digest.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// The published digest.
        expected: String,
        /// The digest of the downloaded bytes.
        actual: String,
    },
}

/// Hex-encoded SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Read the expected digest from checksum file contents.
///
/// # Errors
///
/// Returns [`ChecksumError::Malformed`] when the first token is not a
/// 64-character hex string.
pub fn parse_expected_digest(contents: &str) -> Result<String, ChecksumError> {
    let token = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| ChecksumError::Malformed {
            reason: "file is empty".to_owned(),
        })?;
    if token.len() != DIGEST_HEX_LEN || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChecksumError::Malformed {
            reason: format!("expected {DIGEST_HEX_LEN} hex characters, got {token:?}"),
        });
    }
    Ok(token.to_ascii_lowercase())
}

/// Check `bytes` against the digest published in `checksum_file`.
///
/// # Errors
///
/// Returns [`ChecksumError`] when the file is malformed or the digests
/// differ.
pub fn verify(bytes: &[u8], checksum_file: &str) -> Result<(), ChecksumError> {
    let expected = parse_expected_digest(checksum_file)?;
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(ChecksumError::Mismatch { expected, actual });
    }
    Ok(())
}
