//! Driver configuration loaded from `webdriver.toml`.
//!
//! A [`DriverConfig`] names the driver, the platforms the release host
//! serves, where the required version comes from, and how to ask an
//! installed binary for its version. It is immutable once loaded.

use crate::error::{InstallerError, Result};
use crate::platform::{OsFamily, Platform};
use crate::version::DEFAULT_VERSION_PATTERN;
use camino::Utf8Path;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Default file name of the driver configuration.
pub const DEFAULT_CONFIG_FILENAME: &str = "webdriver.toml";

/// Platform table key that matches every platform.
pub const WILDCARD_PLATFORM: &str = "*";

/// Description of the driver to install.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DriverConfig {
    /// Driver name, e.g. `chromedriver`. Also the default executable name.
    pub name: String,
    /// Archive URL template; `{name}`, `{version}` and `{platform}` are
    /// substituted.
    pub download_url: String,
    /// Optional URL template of a SHA-256 checksum for the archive.
    #[serde(default)]
    pub checksum_url: Option<String>,
    /// Where the required version comes from.
    #[serde(default)]
    pub version: VersionSource,
    /// Supported platform ids mapped to the release host's platform token.
    #[serde(default)]
    pub platforms: BTreeMap<String, String>,
    /// Let the `*` entry also cover platforms the installer cannot name.
    #[serde(default)]
    pub allow_unknown_platforms: bool,
    /// Per-OS executable name overrides.
    #[serde(default)]
    pub executable: ExecutableNames,
    /// How to ask an installed binary for its version.
    #[serde(default)]
    pub version_query: VersionQuery,
}

/// Sources of the required driver version.
///
/// A host-supplied override beats `pinned`, which beats `dependency`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VersionSource {
    /// A literal version.
    #[serde(default)]
    pub pinned: Option<String>,
    /// A companion dependency whose declared version drives the driver
    /// version.
    #[serde(default)]
    pub dependency: Option<String>,
    /// Companion version prefixes mapped to driver versions.
    #[serde(default)]
    pub map: BTreeMap<String, String>,
}

/// Executable file names, per OS family.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExecutableNames {
    /// Name used on every OS without its own entry.
    #[serde(default)]
    pub default: Option<String>,
    /// Linux override.
    #[serde(default)]
    pub linux: Option<String>,
    /// macOS override.
    #[serde(default)]
    pub macos: Option<String>,
    /// Windows override.
    #[serde(default)]
    pub windows: Option<String>,
}

/// The version probe run against an installed binary.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VersionQuery {
    /// Arguments passed to the binary.
    pub args: Vec<String>,
    /// Regex locating the version token in stdout.
    pub pattern: String,
}

impl Default for VersionQuery {
    fn default() -> Self {
        Self {
            args: vec!["--version".to_owned()],
            pattern: DEFAULT_VERSION_PATTERN.to_owned(),
        }
    }
}

impl DriverConfig {
    /// Load and validate a driver configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidDriverConfig`] when the file cannot
    /// be read, is not valid TOML, or fails validation.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| InstallerError::InvalidDriverConfig {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Self::parse(&contents, path)
    }

    /// Parse and validate configuration text. `origin` is only used in
    /// error messages.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::InvalidDriverConfig`] on parse or
    /// validation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use webdriver_installer::config::DriverConfig;
    ///
    /// let config = DriverConfig::parse(
    ///     "name = \"geckodriver\"\ndownload-url = \"https://example.test/{version}.tar.gz\"\n",
    ///     Utf8Path::new("webdriver.toml"),
    /// )?;
    /// assert_eq!(config.name, "geckodriver");
    /// # Ok::<(), webdriver_installer::error::InstallerError>(())
    /// ```
    pub fn parse(contents: &str, origin: &Utf8Path) -> Result<Self> {
        let invalid = |reason: String| InstallerError::InvalidDriverConfig {
            path: origin.to_owned(),
            reason,
        };
        let config: Self =
            toml::from_str(contents).map_err(|e| invalid(format!("TOML parse error: {e}")))?;

        if config.name.trim().is_empty() {
            return Err(invalid("driver name must not be empty".to_owned()));
        }
        if config.download_url.trim().is_empty() {
            return Err(invalid("download-url must not be empty".to_owned()));
        }
        config
            .version_pattern()
            .map_err(|e| invalid(format!("invalid version-query pattern: {e}")))?;

        Ok(config)
    }

    /// Compile the version-query pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error when the pattern does not compile.
    pub fn version_pattern(&self) -> std::result::Result<Regex, regex::Error> {
        Regex::new(&self.version_query.pattern)
    }

    /// The release host's token for `platform`, if the platform is served.
    ///
    /// Exact platform ids win over the `*` wildcard. Unrecognised platforms
    /// only match the wildcard when `allow_unknown_platforms` is set.
    #[must_use]
    pub fn platform_token(&self, platform: &Platform) -> Option<&str> {
        if let Some(token) = self.platforms.get(&platform.id()) {
            return Some(token.as_str());
        }
        if !platform.is_known() && !self.allow_unknown_platforms {
            return None;
        }
        self.platforms.get(WILDCARD_PLATFORM).map(String::as_str)
    }

    /// The executable file name on `platform`.
    ///
    /// Falls back to the driver name, with `.exe` appended on Windows.
    #[must_use]
    pub fn executable_name(&self, platform: &Platform) -> String {
        let specific = match platform.os() {
            Some(OsFamily::Linux) => self.executable.linux.as_ref(),
            Some(OsFamily::MacOs) => self.executable.macos.as_ref(),
            Some(OsFamily::Windows) => self.executable.windows.as_ref(),
            None => None,
        };
        if let Some(name) = specific.or(self.executable.default.as_ref()) {
            return name.clone();
        }
        if platform.is_windows() {
            format!("{}.exe", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Substitute `{name}`, `{version}` and `{platform}` into `template`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use webdriver_installer::config::DriverConfig;
    ///
    /// let config = DriverConfig::parse(
    ///     "name = \"chromedriver\"\ndownload-url = \"https://host/{version}/{name}_{platform}.zip\"\n",
    ///     Utf8Path::new("webdriver.toml"),
    /// )?;
    /// let url = config.render(&config.download_url, "98.0", "linux64");
    /// assert_eq!(url, "https://host/98.0/chromedriver_linux64.zip");
    /// # Ok::<(), webdriver_installer::error::InstallerError>(())
    /// ```
    #[must_use]
    pub fn render(&self, template: &str, version: &str, platform_token: &str) -> String {
        template
            .replace("{name}", &self.name)
            .replace("{version}", version)
            .replace("{platform}", platform_token)
    }
}
