//! Platform support, required version, and installed version resolution.

use crate::config::DriverConfig;
use crate::context::ExecutionContext;
use crate::error::{InstallerError, Result};
use crate::process::CommandRunner;
use crate::version::{VersionSpec, extract_version};
use camino::Utf8Path;
use log::debug;

/// The analysis questions the orchestrator asks before fetching anything.
#[cfg_attr(test, mockall::automock)]
pub trait DriverAnalyser {
    /// Whether the release host serves a driver for the current platform.
    fn resolve_platform_support(&self) -> bool;

    /// The version the project requires.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] when no source yields a
    /// version.
    fn resolve_required_driver_version(&self) -> Result<VersionSpec>;

    /// The version reported by the binary in `bin_dir`, or an empty string
    /// when there is no usable binary.
    fn resolve_installed_driver_version(&self, bin_dir: &Utf8Path) -> String;
}

/// Answers [`DriverAnalyser`] questions from a driver configuration and an
/// execution context.
pub struct ProjectAnalyser<'a> {
    config: &'a DriverConfig,
    context: &'a ExecutionContext,
    runner: &'a dyn CommandRunner,
}

impl<'a> ProjectAnalyser<'a> {
    /// An analyser probing binaries through `runner`.
    #[must_use]
    pub fn new(
        config: &'a DriverConfig,
        context: &'a ExecutionContext,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            context,
            runner,
        }
    }

    fn configuration_error(&self, reason: impl Into<String>) -> InstallerError {
        InstallerError::Configuration {
            driver: self.config.name.clone(),
            reason: reason.into(),
        }
    }

    fn dependency_driven_version(&self, dependency: &str) -> Result<VersionSpec> {
        let declared = self.context.dependency_version(dependency).ok_or_else(|| {
            self.configuration_error(format!("dependency {dependency} is not declared"))
        })?;

        // The most specific prefix wins so `0.19.3` can override `0.19`.
        let mapped = self
            .config
            .version
            .map
            .iter()
            .filter(|(prefix, _)| declared.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, driver_version)| driver_version.as_str());

        let version = VersionSpec::new(mapped.unwrap_or(declared));
        debug!("{dependency} {declared} requires {} {version}", self.config.name);
        Ok(version)
    }
}

impl DriverAnalyser for ProjectAnalyser<'_> {
    fn resolve_platform_support(&self) -> bool {
        self.config
            .platform_token(self.context.platform())
            .is_some()
    }

    fn resolve_required_driver_version(&self) -> Result<VersionSpec> {
        let version = if let Some(version) = self.context.version_override() {
            VersionSpec::new(version)
        } else if let Some(pinned) = self.config.version.pinned.as_deref() {
            VersionSpec::new(pinned)
        } else if let Some(dependency) = self.config.version.dependency.as_deref() {
            self.dependency_driven_version(dependency)?
        } else {
            return Err(self.configuration_error(
                "no version override, pinned version, or companion dependency configured",
            ));
        };

        if version.is_empty() {
            return Err(self.configuration_error("resolved version is blank"));
        }
        Ok(version)
    }

    fn resolve_installed_driver_version(&self, bin_dir: &Utf8Path) -> String {
        let executable = bin_dir.join(self.config.executable_name(self.context.platform()));
        if !executable.is_file() {
            debug!("{executable} is not installed");
            return String::new();
        }

        let output = match self
            .runner
            .run(executable.as_std_path(), &self.config.version_query.args)
        {
            Ok(output) => output,
            Err(e) => {
                debug!("could not run {executable}: {e}");
                return String::new();
            }
        };
        if !output.status.success() {
            debug!("{executable} exited with {}", output.status);
            return String::new();
        }

        let Ok(pattern) = self.config.version_pattern() else {
            return String::new();
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = extract_version(&pattern, &stdout);
        debug!("{executable} reports version {version:?}");
        version
    }
}

#[cfg(test)]
#[path = "analyser_tests.rs"]
mod tests;
