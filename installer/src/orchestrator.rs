//! One installation pass: gate, analyse, fetch, install.
//!
//! The [`Orchestrator`] receives already-built components through their
//! traits and runs them in order, reporting progress on a [`Console`]. Every
//! failure ends the pass with a single error line and
//! [`InstallOutcome::Failed`]; nothing propagates to the caller as an error.

use crate::analyser::{DriverAnalyser, ProjectAnalyser};
use crate::binary_installer::{BinaryInstall, BinaryInstaller};
use crate::config::DriverConfig;
use crate::console::Console;
use crate::context::ExecutionContext;
use crate::error::InstallerError;
use crate::gate::DownloadGate;
use crate::process::TimeoutCommandRunner;
use crate::release::download::HttpDownloader;
use crate::release::package::ReleaseLocator;
use crate::release::{ReleaseFetcher, ReleaseSource, ThreadSleeper};
use crate::version::VersionSpec;
use camino::Utf8PathBuf;
use log::debug;

/// Attempts made per candidate version before giving up.
pub const MAX_DOWNLOAD_ATTEMPTS: u32 = 5;

/// Why a pass ended without installing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The gate refused the invocation.
    Disallowed,
    /// The driver is not published for this platform.
    UnsupportedPlatform,
    /// The installed binary already satisfies the required version.
    AlreadyInstalled,
}

/// How an installation pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Nothing needed doing.
    Skipped(SkipReason),
    /// A dry run resolved what it would install.
    Planned {
        /// The version that would be fetched.
        version: VersionSpec,
        /// The archive URL that would be requested.
        url: String,
    },
    /// The pass failed; the message was already reported.
    Failed {
        /// The reported error message.
        reason: String,
    },
    /// A new binary was installed.
    Installed {
        /// The version that was fetched.
        version: VersionSpec,
        /// Where the executable now lives.
        path: Utf8PathBuf,
    },
}

impl InstallOutcome {
    /// Whether the pass failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Sequences the installation pipeline once.
pub struct Orchestrator<'a> {
    config: &'a DriverConfig,
    context: &'a ExecutionContext,
    gate: DownloadGate,
    analyser: &'a dyn DriverAnalyser,
    source: &'a dyn ReleaseSource,
    installer: &'a dyn BinaryInstall,
    dry_run: bool,
}

impl<'a> Orchestrator<'a> {
    /// An orchestrator over the given components.
    #[must_use]
    pub fn new(
        config: &'a DriverConfig,
        context: &'a ExecutionContext,
        analyser: &'a dyn DriverAnalyser,
        source: &'a dyn ReleaseSource,
        installer: &'a dyn BinaryInstall,
    ) -> Self {
        Self {
            config,
            context,
            gate: DownloadGate,
            analyser,
            source,
            installer,
            dry_run: false,
        }
    }

    /// Stop after resolving versions and report what would be installed.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Run the pass, writing progress to `console`.
    pub fn run(&self, console: &mut dyn Console) -> InstallOutcome {
        let name = &self.config.name;
        if !self.gate.should_allow(self.context) {
            debug!("installation of {name} not allowed in this invocation");
            return InstallOutcome::Skipped(SkipReason::Disallowed);
        }

        if !self.analyser.resolve_platform_support() {
            console.verbose(&format!("SKIPPING {name} setup: platform not supported"));
            return InstallOutcome::Skipped(SkipReason::UnsupportedPlatform);
        }

        let required = match self.analyser.resolve_required_driver_version() {
            Ok(version) => version,
            Err(e) => return fail(console, &e),
        };

        let bin_dir = self.context.bin_dir();
        let installed = self.analyser.resolve_installed_driver_version(bin_dir);
        if required.is_satisfied_by(&installed) {
            console.verbose(&format!("Required version (v{required}) already installed"));
            return InstallOutcome::Skipped(SkipReason::AlreadyInstalled);
        }
        if !installed.is_empty() {
            console.verbose(&format!(
                "Installed version (v{installed}) does not match v{required}"
            ));
        }

        if self.dry_run {
            return self.plan(console, required);
        }

        console.info(&format!("Installing {name} (v{required})"));

        let package = match self
            .source
            .download_release(std::slice::from_ref(&required), MAX_DOWNLOAD_ATTEMPTS)
        {
            Ok(package) => package,
            Err(e) => return fail(console, &e),
        };

        match self.installer.install_binaries(&package, bin_dir) {
            Ok(path) => {
                console.info("");
                console.info("Done");
                InstallOutcome::Installed {
                    version: required,
                    path,
                }
            }
            Err(e) => fail(console, &e),
        }
    }

    fn plan(&self, console: &mut dyn Console, version: VersionSpec) -> InstallOutcome {
        let url = ReleaseLocator::new(self.config, self.context.platform())
            .map(|locator| locator.locate(&version).url)
            .unwrap_or_default();
        console.info(&format!(
            "Would install {} (v{version}) from {url} into {}",
            self.config.name,
            self.context.bin_dir()
        ));
        InstallOutcome::Planned { version, url }
    }
}

fn fail(console: &mut dyn Console, error: &InstallerError) -> InstallOutcome {
    let reason = error.to_string();
    console.error(&reason);
    InstallOutcome::Failed { reason }
}

/// Run one pass with the production analyser, fetcher, and installer.
pub fn install_driver(
    config: &DriverConfig,
    context: &ExecutionContext,
    dry_run: bool,
    console: &mut dyn Console,
) -> InstallOutcome {
    let runner = TimeoutCommandRunner::default();
    let analyser = ProjectAnalyser::new(config, context, &runner);
    let downloader = HttpDownloader;
    let sleeper = ThreadSleeper;
    let fetcher = ReleaseFetcher::new(config, context.platform(), &downloader, &sleeper);
    let installer = BinaryInstaller::new(config.executable_name(context.platform()));

    Orchestrator::new(config, context, &analyser, &fetcher, &installer)
        .dry_run(dry_run)
        .run(console)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
