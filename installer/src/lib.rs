//! WebDriver installer library.
//!
//! Keeps a project-local driver executable (for example `chromedriver` or
//! `geckodriver`) at the version the project requires. It is used by the
//! `webdriver-installer` CLI binary and can be driven programmatically by
//! build tooling that wants to inject its own components.
//!
//! # Modules
//!
//! - [`analyser`] - Platform support, required and installed version resolution
//! - [`binary_installer`] - Atomic placement of the executable
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Driver configuration loaded from `webdriver.toml`
//! - [`console`] - User-facing progress lines
//! - [`context`] - Immutable snapshot of the invocation
//! - [`error`] - Semantic error types
//! - [`gate`] - Whether an invocation may install at all
//! - [`host`] - Host settings readers
//! - [`lockfile`] - Declared dependency versions from `Cargo.lock`
//! - [`orchestrator`] - One installation pass
//! - [`platform`] - Operating system and architecture detection
//! - [`process`] - Running the installed driver for its version
//! - [`release`] - Locating, downloading, and decoding releases
//! - [`version`] - Version tokens and the prefix match rule

pub mod analyser;
pub mod binary_installer;
pub mod cli;
pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod gate;
pub mod host;
pub mod lockfile;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod release;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
