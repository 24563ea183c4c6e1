//! Key-value access to host-provided settings.
//!
//! The pipeline never sees the host's own configuration objects. Everything
//! it needs from the host (directories, run-mode flags, overrides) is read
//! through [`ConfigReader`] using the keys in [`keys`].

use std::collections::BTreeMap;

/// Setting keys understood by the installer.
pub mod keys {
    /// Directory the driver binary is installed into.
    pub const BIN_DIR: &str = "bin-dir";
    /// Directory holding third-party project dependencies.
    pub const VENDOR_DIR: &str = "vendor-dir";
    /// Emit verbosity-gated console lines.
    pub const VERBOSE: &str = "verbose";
    /// Emit diagnostic logging.
    pub const DEBUG: &str = "debug";
    /// Disable driver installation entirely.
    pub const SKIP: &str = "skip";
    /// Host invocation mode (`install`, `update`, `remove`).
    pub const MODE: &str = "mode";
    /// Explicit required driver version, overriding the driver config.
    pub const DRIVER_VERSION: &str = "driver-version";
}

/// Prefix for environment variables read by [`EnvReader`].
pub const ENV_PREFIX: &str = "WEBDRIVER_INSTALLER_";

/// Read-only access to host settings.
pub trait ConfigReader {
    /// Return the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Interpret the value under `key` as a boolean flag.
    ///
    /// `1`, `true`, `yes` and `on` (any case) are true; anything else,
    /// including a missing key, is false.
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| parse_flag(&value))
    }
}

/// Reads settings from `WEBDRIVER_INSTALLER_<KEY>` environment variables.
///
/// Keys are upper-cased and `-` becomes `_`, so `bin-dir` is read from
/// `WEBDRIVER_INSTALLER_BIN_DIR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvReader;

impl EnvReader {
    /// Return the environment variable name for a setting key.
    ///
    /// # Examples
    ///
    /// ```
    /// use webdriver_installer::host::EnvReader;
    ///
    /// assert_eq!(EnvReader::variable_name("bin-dir"), "WEBDRIVER_INSTALLER_BIN_DIR");
    /// ```
    #[must_use]
    pub fn variable_name(key: &str) -> String {
        format!("{ENV_PREFIX}{}", key.to_ascii_uppercase().replace('-', "_"))
    }
}

impl ConfigReader for EnvReader {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable_name(key))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// An in-memory settings map, used for CLI overrides and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReader {
    values: BTreeMap<String, String>,
}

impl MapReader {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), value.into());
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

impl ConfigReader for MapReader {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Two readers stacked: the first one that has a key wins.
pub struct Layered<'a> {
    primary: &'a dyn ConfigReader,
    fallback: &'a dyn ConfigReader,
}

impl<'a> Layered<'a> {
    /// Stack `primary` over `fallback`.
    #[must_use]
    pub fn new(primary: &'a dyn ConfigReader, fallback: &'a dyn ConfigReader) -> Self {
        Self { primary, fallback }
    }
}

impl ConfigReader for Layered<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.primary.get(key).or_else(|| self.fallback.get(key))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
