//! Atomic placement of the driver executable into the binary directory.
//!
//! The payload is written to a hidden temporary file next to its final
//! location, synced, closed, marked executable, and only then renamed over
//! `<bin_dir>/<executable>`. A failure at any step drops the temporary file,
//! so the directory holds either the previous binary or the new one, never a
//! partial write.

use crate::error::{InstallerError, Result};
use crate::release::extraction::ArchiveFormat;
use crate::release::package::{Package, PackageEntry};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::{self, Write};
use std::path::Path;

const WRITE_CHUNK: usize = 64 * 1024;

/// Installs the executable from a decoded package.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryInstall {
    /// Install the package's executable into `bin_dir` and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Installation`] when the package has no
    /// matching entry or the file cannot be written, marked executable, or
    /// renamed into place.
    fn install_binaries(&self, package: &Package, bin_dir: &Utf8Path) -> Result<Utf8PathBuf>;
}

/// Writes payload bytes into the staged file.
pub trait PayloadWriter {
    /// Write all of `bytes` to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write_payload(&self, sink: &mut dyn Write, bytes: &[u8]) -> io::Result<()>;
}

/// Writes the payload in fixed-size chunks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkedWriter;

impl PayloadWriter for ChunkedWriter {
    fn write_payload(&self, sink: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
        for chunk in bytes.chunks(WRITE_CHUNK) {
            sink.write_all(chunk)?;
        }
        sink.flush()
    }
}

/// [`BinaryInstall`] writing through a temporary file and an atomic rename.
pub struct BinaryInstaller<'a> {
    executable: String,
    writer: &'a dyn PayloadWriter,
}

impl BinaryInstaller<'static> {
    /// An installer for the executable file name `executable`.
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self::with_writer(executable, &ChunkedWriter)
    }
}

impl<'a> BinaryInstaller<'a> {
    /// An installer writing payloads through `writer`.
    #[must_use]
    pub fn with_writer(executable: impl Into<String>, writer: &'a dyn PayloadWriter) -> Self {
        Self {
            executable: executable.into(),
            writer,
        }
    }

    /// The executable file name this installer places.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn locate<'p>(&self, package: &'p Package) -> Option<&'p PackageEntry> {
        let by_name = package
            .entries
            .iter()
            .find(|entry| entry.file_name() == self.executable);
        match (by_name, package.format, package.entries.as_slice()) {
            (Some(entry), _, _) => Some(entry),
            (None, ArchiveFormat::Raw, [only]) => Some(only),
            _ => None,
        }
    }

    fn failure(&self, bin_dir: &Utf8Path, reason: impl Into<String>) -> InstallerError {
        InstallerError::Installation {
            executable: self.executable.clone(),
            bin_dir: bin_dir.to_owned(),
            reason: reason.into(),
        }
    }
}

impl BinaryInstall for BinaryInstaller<'_> {
    fn install_binaries(&self, package: &Package, bin_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let entry = self.locate(package).ok_or_else(|| {
            self.failure(
                bin_dir,
                format!("{} does not contain {}", package.release.url, self.executable),
            )
        })?;

        std::fs::create_dir_all(bin_dir)
            .map_err(|e| self.failure(bin_dir, format!("cannot create directory: {e}")))?;

        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.executable))
            .suffix(".partial")
            .tempfile_in(bin_dir)
            .map_err(|e| self.failure(bin_dir, format!("cannot create temporary file: {e}")))?;

        self.writer
            .write_payload(staged.as_file_mut(), &entry.bytes)
            .map_err(|e| self.failure(bin_dir, format!("write failed: {e}")))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| self.failure(bin_dir, format!("sync failed: {e}")))?;

        // Closes the handle; the path is still removed if anything below fails.
        let staged = staged.into_temp_path();
        mark_executable(&staged)
            .map_err(|e| self.failure(bin_dir, format!("cannot mark executable: {e}")))?;

        let target = bin_dir.join(&self.executable);
        staged
            .persist(&target)
            .map_err(|e| self.failure(bin_dir, format!("rename failed: {}", e.error)))?;
        debug!("installed {} bytes to {target}", entry.bytes.len());
        Ok(target)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "binary_installer_tests.rs"]
mod tests;
