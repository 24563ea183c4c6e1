//! Tests for installer CLI parsing and host settings.

use super::*;
use crate::host::ConfigReader;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["webdriver-installer"]);
    assert!(cli.project_dir.is_none());
    assert!(cli.config.is_none());
    assert!(cli.bin_dir.is_none());
    assert!(!cli.verbose);
    assert!(!cli.debug);
    assert!(!cli.skip);
    assert!(cli.mode.is_none());
    assert!(!cli.dry_run);
    assert!(!cli.fail_on_error);
}

#[test]
fn cli_parses_directories_and_version() {
    let cli = Cli::parse_from([
        "webdriver-installer",
        "-p",
        "/work/app",
        "--bin-dir",
        "tools/bin",
        "--vendor-dir",
        "third_party",
        "--driver-version",
        "98.0",
    ]);
    assert_eq!(cli.project_dir, Some(Utf8PathBuf::from("/work/app")));
    let settings = cli.host_settings();
    assert_eq!(settings.get(keys::BIN_DIR).as_deref(), Some("tools/bin"));
    assert_eq!(settings.get(keys::VENDOR_DIR).as_deref(), Some("third_party"));
    assert_eq!(settings.get(keys::DRIVER_VERSION).as_deref(), Some("98.0"));
}

#[rstest]
#[case::install("install")]
#[case::update("update")]
#[case::remove("remove")]
fn cli_accepts_known_modes(#[case] mode: &str) {
    let cli = Cli::parse_from(["webdriver-installer", "--mode", mode]);
    assert_eq!(cli.host_settings().get(keys::MODE).as_deref(), Some(mode));
}

#[test]
fn cli_rejects_unknown_mode() {
    let result = Cli::try_parse_from(["webdriver-installer", "--mode", "purge"]);
    assert!(result.is_err());
}

#[test]
fn unset_flags_are_absent_from_host_settings() {
    let settings = Cli::parse_from(["webdriver-installer"]).host_settings();
    for key in [keys::VERBOSE, keys::DEBUG, keys::SKIP, keys::MODE, keys::BIN_DIR] {
        assert!(settings.get(key).is_none(), "{key} should be unset");
    }
}

#[test]
fn set_flags_read_as_true() {
    let settings = Cli::parse_from(["webdriver-installer", "-v", "--debug", "--skip"]).host_settings();
    assert!(settings.flag(keys::VERBOSE));
    assert!(settings.flag(keys::DEBUG));
    assert!(settings.flag(keys::SKIP));
}

#[rstest]
#[case::default(None, "/work/app/webdriver.toml")]
#[case::relative(Some("ci/drivers.toml"), "/work/app/ci/drivers.toml")]
#[case::absolute(Some("/etc/webdriver.toml"), "/etc/webdriver.toml")]
fn config_path_resolves_against_project_dir(#[case] config: Option<&str>, #[case] expected: &str) {
    let cli = Cli {
        config: config.map(Utf8PathBuf::from),
        ..Cli::default()
    };
    assert_eq!(cli.config_path(Utf8Path::new("/work/app")), expected);
}
