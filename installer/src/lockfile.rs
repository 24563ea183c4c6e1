//! Declared dependency versions from a project's `Cargo.lock`.
//!
//! The companion-dependency version source needs to know which version of a
//! library the project resolved. A missing or unreadable lock file yields an
//! empty map; the analyser then reports a configuration error only if it
//! actually needed one of these versions.

use camino::Utf8Path;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Default lock file name.
pub const LOCKFILE_NAME: &str = "Cargo.lock";

/// Read `[[package]]` name/version pairs from the lock file in `project_dir`.
#[must_use]
pub fn declared_versions(project_dir: &Utf8Path) -> BTreeMap<String, String> {
    let path = project_dir.join(LOCKFILE_NAME);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("no dependency versions from {path}: {e}");
            return BTreeMap::new();
        }
    };
    match parse_declared_versions(&contents) {
        Some(versions) => versions,
        None => {
            warn!("ignoring malformed lock file {path}");
            BTreeMap::new()
        }
    }
}

/// Parse lock file contents. Returns `None` when the text is not TOML.
///
/// When a package appears at several versions the first entry wins.
#[must_use]
pub fn parse_declared_versions(contents: &str) -> Option<BTreeMap<String, String>> {
    let table: toml::Table = contents.parse().ok()?;
    let mut versions = BTreeMap::new();
    let packages = table
        .get("package")
        .and_then(toml::Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for package in packages {
        let name = package.get("name").and_then(toml::Value::as_str);
        let version = package.get("version").and_then(toml::Value::as_str);
        if let (Some(name), Some(version)) = (name, version) {
            versions
                .entry(name.to_owned())
                .or_insert_with(|| version.to_owned());
        }
    }
    Some(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = concat!(
        "version = 4\n\n",
        "[[package]]\n",
        "name = \"fantoccini\"\n",
        "version = \"0.19.3\"\n",
        "source = \"registry+https://github.com/rust-lang/crates.io-index\"\n\n",
        "[[package]]\n",
        "name = \"fantoccini\"\n",
        "version = \"0.21.0\"\n\n",
        "[[package]]\n",
        "name = \"broken\"\n",
    );

    #[test]
    fn collects_first_version_per_package() {
        let versions = parse_declared_versions(LOCK).expect("valid lock file");
        assert_eq!(versions.get("fantoccini").map(String::as_str), Some("0.19.3"));
        assert!(!versions.contains_key("broken"));
    }

    #[test]
    fn rejects_non_toml() {
        assert!(parse_declared_versions("[[package").is_none());
    }

    #[test]
    fn missing_lock_file_is_empty() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Utf8Path::from_path(temp.path()).expect("UTF-8 path");
        assert!(declared_versions(dir).is_empty());
    }

    #[test]
    fn reads_lock_file_from_project_dir() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Utf8Path::from_path(temp.path()).expect("UTF-8 path");
        std::fs::write(dir.join(LOCKFILE_NAME), LOCK).expect("write lock file");
        assert_eq!(
            declared_versions(dir).get("fantoccini").map(String::as_str),
            Some("0.19.3")
        );
    }
}
