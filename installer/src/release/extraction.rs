//! Decoding downloaded release bodies into [`PackageEntry`] values.
//!
//! Release hosts ship drivers as zip files, gzip or zstd compressed tarballs,
//! or a bare executable. The format is sniffed from the leading bytes. When
//! the URL names an archive type, the body must carry that archive's magic;
//! an HTML error page served with a 200 status is rejected, not installed.
//! Everything stays in memory; nothing touches the file system until
//! installation.

use super::package::PackageEntry;
use std::io::{Cursor, Read};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Encoding of a downloaded release body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A zip archive.
    Zip,
    /// A gzip-compressed tarball.
    TarGz,
    /// A zstd-compressed tarball.
    TarZst,
    /// The executable itself.
    Raw,
}

impl ArchiveFormat {
    /// Sniff the format from the first bytes of `bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use webdriver_installer::release::extraction::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::detect(b"PK\x03\x04rest"), ArchiveFormat::Zip);
    /// assert_eq!(ArchiveFormat::detect(b"\x7fELF"), ArchiveFormat::Raw);
    /// ```
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Zip
        } else if bytes.starts_with(GZIP_MAGIC) {
            Self::TarGz
        } else if bytes.starts_with(ZSTD_MAGIC) {
            Self::TarZst
        } else {
            Self::Raw
        }
    }

    /// The archive type a download URL announces by its extension.
    ///
    /// Query strings and fragments are ignored. URLs without a known archive
    /// extension announce nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use webdriver_installer::release::extraction::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::from_url("https://host/v1/driver.tgz?sig=abc"),
    ///     Some(ArchiveFormat::TarGz)
    /// );
    /// assert_eq!(ArchiveFormat::from_url("https://host/v1/driver"), None);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let path = path.to_ascii_lowercase();
        if path.ends_with(".zip") {
            Some(Self::Zip)
        } else if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if path.ends_with(".tar.zst") || path.ends_with(".tzst") {
            Some(Self::TarZst)
        } else {
            None
        }
    }
}

/// Errors arising from decoding a release body.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The tarball or its compression layer is corrupt.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip archive is corrupt.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The download decoded to no regular files.
    #[error("archive contains no files")]
    EmptyArchive,

    /// The body does not start with the magic bytes of the announced archive.
    #[error("expected a {expected:?} archive but the body looks like {found:?}")]
    FormatMismatch {
        /// The format the URL announced.
        expected: ArchiveFormat,
        /// The format sniffed from the body.
        found: ArchiveFormat,
    },
}

/// Decode `bytes` according to its sniffed format.
///
/// `raw_name` names the single entry produced for a bare executable.
/// `announced` is the format the download URL promised, if any.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the body is corrupt, holds no files, or
/// is not the announced kind of archive.
pub fn decode(
    bytes: &[u8],
    raw_name: &str,
    announced: Option<ArchiveFormat>,
) -> Result<(ArchiveFormat, Vec<PackageEntry>), ExtractionError> {
    let format = ArchiveFormat::detect(bytes);
    if let Some(expected) = announced.filter(|expected| *expected != format) {
        return Err(ExtractionError::FormatMismatch {
            expected,
            found: format,
        });
    }
    let entries = match format {
        ArchiveFormat::Zip => decode_zip(bytes)?,
        ArchiveFormat::TarGz => decode_tar(flate2::read::GzDecoder::new(bytes))?,
        ArchiveFormat::TarZst => decode_tar(zstd::Decoder::new(bytes)?)?,
        ArchiveFormat::Raw if bytes.is_empty() => Vec::new(),
        ArchiveFormat::Raw => vec![PackageEntry {
            name: raw_name.to_owned(),
            bytes: bytes.to_vec(),
            mode: None,
        }],
    };

    if entries.is_empty() {
        return Err(ExtractionError::EmptyArchive);
    }
    log::debug!("decoded {} entries from {format:?} download", entries.len());
    Ok((format, entries))
}

fn decode_zip(bytes: &[u8]) -> Result<Vec<PackageEntry>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        entries.push(PackageEntry {
            name: file.name().to_owned(),
            bytes: contents,
            mode: file.unix_mode(),
        });
    }
    Ok(entries)
}

fn decode_tar(reader: impl Read) -> Result<Vec<PackageEntry>, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mode = entry.header().mode().ok();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        entries.push(PackageEntry {
            name,
            bytes: contents,
            mode,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{tar_gz_archive, tar_zst_archive, zip_archive};
    use rstest::rstest;

    #[rstest]
    #[case::zip(
        zip_archive(&[("chromedriver-linux64/chromedriver", b"elf")]),
        ArchiveFormat::Zip
    )]
    #[case::tar_gz(tar_gz_archive(&[("geckodriver", b"elf")]), ArchiveFormat::TarGz)]
    #[case::tar_zst(tar_zst_archive(&[("geckodriver", b"elf")]), ArchiveFormat::TarZst)]
    #[case::raw(b"elf".to_vec(), ArchiveFormat::Raw)]
    fn decodes_each_format(#[case] bytes: Vec<u8>, #[case] expected: ArchiveFormat) {
        let (format, entries) = decode(&bytes, "driver", None).expect("decodes");
        assert_eq!(format, expected);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bytes, b"elf");
    }

    #[test]
    fn tar_entries_keep_their_mode() {
        let bytes = tar_gz_archive(&[("geckodriver", b"elf")]);
        let (_, entries) = decode(&bytes, "driver", None).expect("decodes");
        assert_eq!(entries[0].mode.map(|mode| mode & 0o777), Some(0o755));
    }

    #[test]
    fn raw_entry_uses_given_name() {
        let (_, entries) = decode(b"#!/bin/sh\n", "chromedriver", None).expect("decodes");
        assert_eq!(entries[0].name, "chromedriver");
    }

    #[test]
    fn truncated_zip_is_an_error() {
        let mut bytes = zip_archive(&[("chromedriver", b"elf")]);
        bytes.truncate(10);
        assert!(matches!(
            decode(&bytes, "driver", None),
            Err(ExtractionError::Zip(_) | ExtractionError::Io(_))
        ));
    }

    #[test]
    fn corrupt_gzip_is_an_error() {
        let bytes = [0x1f, 0x8b, 0x08, 0x00, 0xde, 0xad];
        assert!(decode(&bytes, "driver", None).is_err());
    }

    #[test]
    fn empty_body_is_an_empty_archive() {
        assert!(matches!(
            decode(&[], "driver", None),
            Err(ExtractionError::EmptyArchive)
        ));
    }

    #[rstest]
    #[case::zip("https://host/98.0/chromedriver_linux64.zip", Some(ArchiveFormat::Zip))]
    #[case::tgz("https://host/geckodriver-linux64.tar.gz", Some(ArchiveFormat::TarGz))]
    #[case::short_tgz("https://host/driver.TGZ", Some(ArchiveFormat::TarGz))]
    #[case::zst("https://host/driver.tar.zst", Some(ArchiveFormat::TarZst))]
    #[case::signed("https://host/driver.zip?X-Amz-Signature=ab", Some(ArchiveFormat::Zip))]
    #[case::bare("https://host/98.0/chromedriver", None)]
    fn url_announces_format(#[case] url: &str, #[case] expected: Option<ArchiveFormat>) {
        assert_eq!(ArchiveFormat::from_url(url), expected);
    }

    #[test]
    fn html_page_is_not_a_zip() {
        let page = b"<html><body>Access denied</body></html>";
        assert!(matches!(
            decode(page, "chromedriver", Some(ArchiveFormat::Zip)),
            Err(ExtractionError::FormatMismatch {
                expected: ArchiveFormat::Zip,
                found: ArchiveFormat::Raw,
            })
        ));
    }

    #[test]
    fn announced_format_that_matches_decodes() {
        let bytes = tar_gz_archive(&[("geckodriver", b"elf")]);
        let (format, _) =
            decode(&bytes, "geckodriver", Some(ArchiveFormat::TarGz)).expect("decodes");
        assert_eq!(format, ArchiveFormat::TarGz);
    }
}
