//! User-facing console lines.
//!
//! The pipeline reports progress through the [`Console`] line-logger rather
//! than a concrete writer. Informational and error lines are always emitted;
//! verbose lines only when the host asked for them. Diagnostic detail goes
//! through the `log` facade instead.

use std::io::Write;

/// A leveled line-logger.
pub trait Console {
    /// A line that is always shown.
    fn info(&mut self, line: &str);

    /// A line shown only in verbose mode.
    fn verbose(&mut self, line: &str);

    /// A failure line; always shown.
    fn error(&mut self, line: &str);
}

/// Writes console lines to any [`Write`] sink, typically stderr.
pub struct StreamConsole<'a> {
    sink: &'a mut dyn Write,
    verbose: bool,
}

impl<'a> StreamConsole<'a> {
    /// Wrap `sink`, showing verbose lines only when `verbose` is set.
    #[must_use]
    pub fn new(sink: &'a mut dyn Write, verbose: bool) -> Self {
        Self { sink, verbose }
    }
}

impl Console for StreamConsole<'_> {
    fn info(&mut self, line: &str) {
        write_stderr_line(self.sink, line);
    }

    fn verbose(&mut self, line: &str) {
        if self.verbose {
            write_stderr_line(self.sink, line);
        }
    }

    fn error(&mut self, line: &str) {
        write_stderr_line(self.sink, format!("error: {line}"));
    }
}

/// Collects lines in memory, keeping the verbose flag semantics.
///
/// Useful to hosts that render output themselves and to tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingConsole {
    verbose: bool,
    lines: Vec<ConsoleLine>,
}

/// One recorded console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// An always-shown line.
    Info(String),
    /// A verbose line that passed the verbosity gate.
    Verbose(String),
    /// A failure line.
    Error(String),
}

impl ConsoleLine {
    /// The text of the line, whatever its level.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Verbose(text) | Self::Error(text) => text,
        }
    }
}

impl RecordingConsole {
    /// Create a recorder; verbose lines are dropped unless `verbose` is set.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            lines: Vec::new(),
        }
    }

    /// All recorded lines, in order.
    #[must_use]
    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// Whether any recorded line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text().contains(needle))
    }

    /// Recorded error lines.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            ConsoleLine::Error(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Console for RecordingConsole {
    fn info(&mut self, line: &str) {
        self.lines.push(ConsoleLine::Info(line.to_owned()));
    }

    fn verbose(&mut self, line: &str) {
        if self.verbose {
            self.lines.push(ConsoleLine::Verbose(line.to_owned()));
        }
    }

    fn error(&mut self, line: &str) {
        self.lines.push(ConsoleLine::Error(line.to_owned()));
    }
}

/// Write one line, ignoring write failures.
///
/// Console output is best-effort; a closed stderr must not turn into an
/// installation failure.
pub fn write_stderr_line(stderr: &mut dyn Write, line: impl AsRef<str>) {
    if writeln!(stderr, "{}", line.as_ref()).is_err() {
        log::trace!("console write failed");
    }
}
