//! Locating, downloading, verifying, and decoding driver releases.
//!
//! # Sub-modules
//!
//! - [`package`] - Release coordinates and decoded package entries.
//! - [`download`] - Transfer trait and `ureq` implementation.
//! - [`checksum`] - Optional SHA-256 verification.
//! - [`extraction`] - Archive format detection and in-memory decoding.
//! - [`fetcher`] - Candidate iteration with bounded, backed-off retries.

pub mod checksum;
pub mod download;
pub mod extraction;
pub mod fetcher;
pub mod package;

pub use fetcher::{ReleaseFetcher, ReleaseSource, Sleeper, ThreadSleeper};
pub use package::{Package, PackageEntry, Release};
