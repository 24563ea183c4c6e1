//! Running an installed driver to ask for its version.

use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Upper bound on how long a version probe may run.
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args` and capture stdout.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the program cannot be started, cannot be
    /// waited on, or exceeds the runner's time limit.
    fn run(&self, program: &Path, args: &[String]) -> io::Result<Output>;
}

/// Runs commands on the host, killing them after a timeout.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutCommandRunner {
    timeout: Duration,
}

impl TimeoutCommandRunner {
    /// A runner with a custom time limit.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TimeoutCommandRunner {
    fn default() -> Self {
        Self::new(VERSION_PROBE_TIMEOUT)
    }
}

impl CommandRunner for TimeoutCommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<Output> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(io::read_to_string)
                    .transpose()?
                    .unwrap_or_default();
                Ok(Output {
                    status,
                    stdout: stdout.into_bytes(),
                    stderr: Vec::new(),
                })
            }
            None => {
                if child.kill().is_err() {
                    log::debug!("could not kill {}", program.display());
                }
                if child.wait().is_err() {
                    log::debug!("could not reap {}", program.display());
                }
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "{} did not exit within {} seconds",
                        program.display(),
                        self.timeout.as_secs()
                    ),
                ))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let runner = TimeoutCommandRunner::default();
        let output = runner
            .run(Path::new("/bin/sh"), &["-c".to_owned(), "echo 1.2.3".to_owned()])
            .expect("sh should run");
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1.2.3");
    }

    #[test]
    fn missing_program_is_an_error() {
        let runner = TimeoutCommandRunner::default();
        let result = runner.run(Path::new("/definitely/not/here"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn slow_program_times_out() {
        let runner = TimeoutCommandRunner::new(Duration::from_millis(100));
        let err = runner
            .run(Path::new("/bin/sh"), &["-c".to_owned(), "sleep 5".to_owned()])
            .expect_err("sleep should time out");
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
