//! Immutable snapshot of the invoking environment.
//!
//! An [`ExecutionContext`] is built once per run from host settings and then
//! only read. Construction cannot fail: unknown platforms become
//! [`Platform::Unsupported`], unparsable flags read as false, and an unknown
//! invocation mode reads as [`InvocationMode::Install`].

use crate::host::{ConfigReader, keys};
use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;

const DEFAULT_VENDOR_DIRNAME: &str = "vendor";
const DEFAULT_BIN_DIRNAME: &str = "bin";

/// What the host is doing when it invokes the installer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Dependencies are being installed.
    #[default]
    Install,
    /// Dependencies are being updated.
    Update,
    /// The project's dependencies are being removed.
    Remove,
}

impl InvocationMode {
    /// Parse a host mode string; anything unrecognised is `Install`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "update" | "upgrade" => Self::Update,
            "remove" | "uninstall" => Self::Remove,
            _ => Self::Install,
        }
    }
}

/// Boolean run modes requested by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunModes {
    /// Emit verbosity-gated console lines.
    pub verbose: bool,
    /// Emit diagnostic logging.
    pub debug: bool,
    /// Skip driver installation entirely.
    pub disabled: bool,
}

/// Everything the pipeline needs to know about the current invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    working_dir: Utf8PathBuf,
    vendor_dir: Utf8PathBuf,
    bin_dir: Utf8PathBuf,
    platform: Platform,
    modes: RunModes,
    invocation: InvocationMode,
    version_override: Option<String>,
    dependency_versions: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Build a context from host settings.
    ///
    /// Relative `vendor-dir` and `bin-dir` values resolve against
    /// `working_dir`. The vendor directory defaults to `<working_dir>/vendor`
    /// and the binary directory to `<vendor_dir>/bin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use webdriver_installer::context::ExecutionContext;
    /// use webdriver_installer::host::MapReader;
    /// use webdriver_installer::platform::Platform;
    ///
    /// let ctx = ExecutionContext::from_reader(
    ///     Utf8Path::new("/project"),
    ///     &MapReader::new(),
    ///     Platform::from_parts("linux", "x86_64"),
    ///     Default::default(),
    /// );
    /// assert_eq!(ctx.bin_dir(), Utf8Path::new("/project/vendor/bin"));
    /// ```
    #[must_use]
    pub fn from_reader(
        working_dir: &Utf8Path,
        reader: &dyn ConfigReader,
        platform: Platform,
        dependency_versions: BTreeMap<String, String>,
    ) -> Self {
        let vendor_dir = reader.get(keys::VENDOR_DIR).map_or_else(
            || working_dir.join(DEFAULT_VENDOR_DIRNAME),
            |dir| resolve_against(working_dir, &dir),
        );
        let bin_dir = reader.get(keys::BIN_DIR).map_or_else(
            || vendor_dir.join(DEFAULT_BIN_DIRNAME),
            |dir| resolve_against(working_dir, &dir),
        );
        let modes = RunModes {
            verbose: reader.flag(keys::VERBOSE),
            debug: reader.flag(keys::DEBUG),
            disabled: reader.flag(keys::SKIP),
        };
        let invocation = reader
            .get(keys::MODE)
            .map(|mode| InvocationMode::parse(&mode))
            .unwrap_or_default();
        let version_override = reader
            .get(keys::DRIVER_VERSION)
            .map(|version| version.trim().to_owned())
            .filter(|version| !version.is_empty());

        Self {
            working_dir: working_dir.to_owned(),
            vendor_dir,
            bin_dir,
            platform,
            modes,
            invocation,
            version_override,
            dependency_versions,
        }
    }

    /// The directory the host was invoked from.
    #[must_use]
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }

    /// The directory holding third-party project dependencies.
    #[must_use]
    pub fn vendor_dir(&self) -> &Utf8Path {
        &self.vendor_dir
    }

    /// The directory the driver binary lives in.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// The normalised host platform.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Requested run modes.
    #[must_use]
    pub fn modes(&self) -> RunModes {
        self.modes
    }

    /// What the host is doing.
    #[must_use]
    pub fn invocation(&self) -> InvocationMode {
        self.invocation
    }

    /// An explicit required version supplied by the host, if any.
    #[must_use]
    pub fn version_override(&self) -> Option<&str> {
        self.version_override.as_deref()
    }

    /// The declared version of a project dependency, if known.
    #[must_use]
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        self.dependency_versions.get(name).map(String::as_str)
    }
}

fn resolve_against(base: &Utf8Path, dir: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(dir.trim());
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MapReader;
    use rstest::rstest;

    fn build(reader: &MapReader) -> ExecutionContext {
        ExecutionContext::from_reader(
            Utf8Path::new("/project"),
            reader,
            Platform::from_parts("linux", "x86_64"),
            BTreeMap::from([("fantoccini".to_owned(), "0.19.3".to_owned())]),
        )
    }

    #[test]
    fn defaults_follow_vendor_layout() {
        let ctx = build(&MapReader::new());
        assert_eq!(ctx.vendor_dir(), Utf8Path::new("/project/vendor"));
        assert_eq!(ctx.bin_dir(), Utf8Path::new("/project/vendor/bin"));
        assert_eq!(ctx.modes(), RunModes::default());
        assert_eq!(ctx.invocation(), InvocationMode::Install);
        assert!(ctx.version_override().is_none());
    }

    #[test]
    fn bin_dir_follows_custom_vendor_dir() {
        let ctx = build(&MapReader::new().with(keys::VENDOR_DIR, "deps"));
        assert_eq!(ctx.bin_dir(), Utf8Path::new("/project/deps/bin"));
    }

    #[test]
    fn absolute_bin_dir_is_kept() {
        let ctx = build(&MapReader::new().with(keys::BIN_DIR, "/opt/drivers"));
        assert_eq!(ctx.bin_dir(), Utf8Path::new("/opt/drivers"));
    }

    #[test]
    fn run_modes_and_override_are_read() {
        let reader = MapReader::new()
            .with(keys::VERBOSE, "1")
            .with(keys::DEBUG, "true")
            .with(keys::SKIP, "no")
            .with(keys::DRIVER_VERSION, " 98.0 ");
        let ctx = build(&reader);
        assert!(ctx.modes().verbose);
        assert!(ctx.modes().debug);
        assert!(!ctx.modes().disabled);
        assert_eq!(ctx.version_override(), Some("98.0"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let ctx = build(&MapReader::new().with(keys::DRIVER_VERSION, "  "));
        assert!(ctx.version_override().is_none());
    }

    #[rstest]
    #[case::install("install", InvocationMode::Install)]
    #[case::update("Update", InvocationMode::Update)]
    #[case::uninstall("uninstall", InvocationMode::Remove)]
    #[case::unknown("frobnicate", InvocationMode::Install)]
    fn parses_invocation_mode(#[case] raw: &str, #[case] expected: InvocationMode) {
        assert_eq!(InvocationMode::parse(raw), expected);
    }

    #[test]
    fn dependency_versions_are_looked_up_by_name() {
        let ctx = build(&MapReader::new());
        assert_eq!(ctx.dependency_version("fantoccini"), Some("0.19.3"));
        assert!(ctx.dependency_version("thirtyfour").is_none());
    }
}
