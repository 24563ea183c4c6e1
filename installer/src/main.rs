//! WebDriver installer CLI entrypoint.
//!
//! Snapshots the invocation, loads the driver configuration when the
//! invocation may install, and runs one installation pass. Progress goes to
//! stderr.

use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;
use std::io::Write;
use webdriver_installer::cli::Cli;
use webdriver_installer::config::DriverConfig;
use webdriver_installer::console::{StreamConsole, write_stderr_line};
use webdriver_installer::context::ExecutionContext;
use webdriver_installer::error::{InstallerError, Result};
use webdriver_installer::gate::DownloadGate;
use webdriver_installer::host::{ConfigReader, EnvReader, Layered, keys};
use webdriver_installer::lockfile::declared_versions;
use webdriver_installer::orchestrator::{InstallOutcome, SkipReason, install_driver};
use webdriver_installer::platform::Platform;

fn main() {
    let cli = Cli::parse();
    let cli_settings = cli.host_settings();
    let settings = Layered::new(&cli_settings, &EnvReader);
    init_logging(settings.flag(keys::DEBUG));

    let mut stderr = std::io::stderr();
    let result = run(&cli, &settings, &mut stderr);
    let exit_code = exit_code_for_run_result(result, cli.fail_on_error, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// `warn` by default, `debug` on request; `RUST_LOG` overrides both.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init()
    {
        log::trace!("logger already installed: {e}");
    }
}

fn run(cli: &Cli, settings: &dyn ConfigReader, stderr: &mut dyn Write) -> Result<InstallOutcome> {
    let project_dir = resolve_project_dir(cli)?;
    let context = ExecutionContext::from_reader(
        &project_dir,
        settings,
        Platform::current(),
        declared_versions(&project_dir),
    );
    log::debug!("{context:?}");

    // A denied invocation needs no driver configuration at all.
    if !DownloadGate.should_allow(&context) {
        log::debug!("driver installation not allowed in this invocation");
        return Ok(InstallOutcome::Skipped(SkipReason::Disallowed));
    }

    let config = DriverConfig::load(&cli.config_path(&project_dir))?;

    let mut console = StreamConsole::new(stderr, context.modes().verbose);
    Ok(install_driver(&config, &context, cli.dry_run, &mut console))
}

fn resolve_project_dir(cli: &Cli) -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| InstallerError::Io(e.into_io_error()))?;
    Ok(match &cli.project_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

/// Handled failures exit 0 unless `fail_on_error` is set.
fn exit_code_for_run_result(
    result: Result<InstallOutcome>,
    fail_on_error: bool,
    stderr: &mut dyn Write,
) -> i32 {
    let failed = match result {
        Ok(outcome) => outcome.is_failure(),
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            true
        }
    };
    i32::from(failed && fail_on_error)
}
