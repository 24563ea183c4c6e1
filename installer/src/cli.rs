//! CLI argument definitions for the WebDriver installer.
//!
//! Flags map onto the same host settings the `WEBDRIVER_INSTALLER_*`
//! environment variables provide; a flag given on the command line wins over
//! its variable.

use crate::config::DEFAULT_CONFIG_FILENAME;
use crate::host::{MapReader, keys};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

/// Install the WebDriver binary a project requires.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "webdriver-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the WebDriver binary a project requires.\n\n",
    "Reads the driver description from webdriver.toml, works out which driver ",
    "version the project needs, and downloads it into the project's binary ",
    "directory when the installed binary is missing or does not match.\n\n",
    "Failures are reported but do not fail the invocation unless ",
    "--fail-on-error is given, so build steps can run the installer ",
    "unconditionally.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  WEBDRIVER_INSTALLER_BIN_DIR          Same as --bin-dir\n",
    "  WEBDRIVER_INSTALLER_VENDOR_DIR       Same as --vendor-dir\n",
    "  WEBDRIVER_INSTALLER_VERBOSE          Same as --verbose\n",
    "  WEBDRIVER_INSTALLER_DEBUG            Same as --debug\n",
    "  WEBDRIVER_INSTALLER_SKIP             Same as --skip\n",
    "  WEBDRIVER_INSTALLER_MODE             Same as --mode\n",
    "  WEBDRIVER_INSTALLER_DRIVER_VERSION   Same as --driver-version\n\n",
    "EXAMPLES:\n",
    "  Install or update the driver for the current project:\n",
    "    $ webdriver-installer\n\n",
    "  Force a specific driver version:\n",
    "    $ webdriver-installer --driver-version 98.0\n\n",
    "  Preview without downloading:\n",
    "    $ webdriver-installer --dry-run -v",
))]
pub struct Cli {
    /// Project root holding webdriver.toml and Cargo.lock [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub project_dir: Option<Utf8PathBuf>,

    /// Driver configuration file [default: <project-dir>/webdriver.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory receiving the driver executable [default: <vendor-dir>/bin].
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<Utf8PathBuf>,

    /// Vendor directory [default: <project-dir>/vendor].
    #[arg(long, value_name = "DIR")]
    pub vendor_dir: Option<Utf8PathBuf>,

    /// Show informational lines such as skip reasons.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit diagnostic logging.
    #[arg(long)]
    pub debug: bool,

    /// Do nothing; useful to disable the step without editing scripts.
    #[arg(long)]
    pub skip: bool,

    /// What the invoking build step is doing.
    #[arg(long, value_name = "MODE", value_parser = ["install", "update", "remove"])]
    pub mode: Option<String>,

    /// Required driver version, overriding webdriver.toml.
    #[arg(long, value_name = "VERSION")]
    pub driver_version: Option<String>,

    /// Resolve versions and report what would be installed, then exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 1 when installation fails.
    #[arg(long)]
    pub fail_on_error: bool,
}

impl Cli {
    /// The host settings given on the command line.
    ///
    /// Only flags that were actually supplied are present, so unset flags
    /// fall through to the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use webdriver_installer::cli::Cli;
    /// use webdriver_installer::host::{ConfigReader, keys};
    ///
    /// let cli = Cli::parse_from(["webdriver-installer", "--skip"]);
    /// let settings = cli.host_settings();
    /// assert!(settings.flag(keys::SKIP));
    /// assert!(settings.get(keys::BIN_DIR).is_none());
    /// ```
    #[must_use]
    pub fn host_settings(&self) -> MapReader {
        let mut settings = MapReader::new();
        let values = [
            (keys::BIN_DIR, self.bin_dir.as_deref().map(Utf8Path::as_str)),
            (keys::VENDOR_DIR, self.vendor_dir.as_deref().map(Utf8Path::as_str)),
            (keys::MODE, self.mode.as_deref()),
            (keys::DRIVER_VERSION, self.driver_version.as_deref()),
        ];
        for (key, value) in values {
            if let Some(value) = value {
                settings.insert(key, value);
            }
        }

        let flags = [
            (keys::VERBOSE, self.verbose),
            (keys::DEBUG, self.debug),
            (keys::SKIP, self.skip),
        ];
        for (key, set) in flags {
            if set {
                settings.insert(key, "1");
            }
        }
        settings
    }

    /// The driver configuration path for `project_dir`.
    #[must_use]
    pub fn config_path(&self, project_dir: &Utf8Path) -> Utf8PathBuf {
        match &self.config {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project_dir.join(path),
            None => project_dir.join(DEFAULT_CONFIG_FILENAME),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
