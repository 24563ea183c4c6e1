//! Required-version tokens and the prefix-match rule.
//!
//! Versions are compared as plain strings: an installed version satisfies a
//! requirement when it *starts with* the required string. This tolerates
//! drivers that report a longer build number (`98.0.4758.102` satisfies
//! `98.0`). It is not semantic-version matching: `1.10` also satisfies
//! `1.1`.

use regex::Regex;
use std::fmt;

/// Pattern used to pull a version token out of `--version` output when the
/// driver configuration does not supply one.
pub const DEFAULT_VERSION_PATTERN: &str = r"\d+(?:\.\d+)+";

/// A required driver version.
///
/// # Examples
///
/// ```
/// use webdriver_installer::version::VersionSpec;
///
/// let required = VersionSpec::new("98.0");
/// assert!(required.is_satisfied_by("98.0.4758.102"));
/// assert!(!required.is_satisfied_by("97.0.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec(String);

impl VersionSpec {
    /// Wrap a version string, trimming surrounding whitespace and a leading
    /// `v`.
    #[must_use]
    pub fn new(value: &str) -> Self {
        let trimmed = value.trim();
        let stripped = trimmed
            .strip_prefix('v')
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(trimmed);
        Self(stripped.to_owned())
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the version is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply the prefix-match rule against an installed version string.
    ///
    /// An empty requirement is never satisfied; the analyser refuses to
    /// produce one, so this only guards direct callers.
    #[must_use]
    pub fn is_satisfied_by(&self, installed: &str) -> bool {
        !self.0.is_empty() && installed.starts_with(self.0.as_str())
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VersionSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Extract the first version token matched by `pattern` in `output`.
///
/// When the pattern has a capture group the first group is returned,
/// otherwise the whole match. Returns an empty string when nothing matches.
#[must_use]
pub fn extract_version(pattern: &Regex, output: &str) -> String {
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}
