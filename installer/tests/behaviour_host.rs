//! Behaviour tests for layering command-line flags over environment
//! variables.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::collections::BTreeMap;
use webdriver_installer::cli::Cli;
use webdriver_installer::context::ExecutionContext;
use webdriver_installer::gate::DownloadGate;
use webdriver_installer::host::{EnvReader, Layered, keys};
use webdriver_installer::platform::Platform;

const PROJECT: &str = "/project";

const ALL_KEYS: [&str; 7] = [
    keys::BIN_DIR,
    keys::VENDOR_DIR,
    keys::VERBOSE,
    keys::DEBUG,
    keys::SKIP,
    keys::MODE,
    keys::DRIVER_VERSION,
];

#[derive(Default)]
struct HostWorld {
    env: BTreeMap<String, String>,
    args: Vec<String>,
    context: Option<ExecutionContext>,
}

impl HostWorld {
    fn context(&self) -> &ExecutionContext {
        self.context.as_ref().expect("context built")
    }
}

#[fixture]
fn world() -> HostWorld {
    HostWorld::default()
}

#[given("the environment sets \"{key}\" to \"{value}\"")]
fn given_env(world: &mut HostWorld, key: String, value: String) {
    world.env.insert(key, value);
}

#[given("the command line passes \"{flag}\" \"{value}\"")]
fn given_cli(world: &mut HostWorld, flag: String, value: String) {
    world.args.push(flag);
    world.args.push(value);
}

#[when("the context is built")]
fn when_context_built(world: &mut HostWorld) {
    let argv = std::iter::once("webdriver-installer".to_owned()).chain(world.args.clone());
    let cli = Cli::parse_from(argv);
    let cli_settings = cli.host_settings();
    let vars: Vec<(String, Option<String>)> = ALL_KEYS
        .iter()
        .map(|key| (EnvReader::variable_name(key), world.env.get(*key).cloned()))
        .collect();

    let context = temp_env::with_vars(vars, || {
        let settings = Layered::new(&cli_settings, &EnvReader);
        ExecutionContext::from_reader(
            Utf8Path::new(PROJECT),
            &settings,
            Platform::from_parts("linux", "x86_64"),
            BTreeMap::new(),
        )
    });
    world.context = Some(context);
}

#[then("the binary directory is \"{dir}\" under the project")]
fn then_bin_dir(world: &mut HostWorld, dir: String) {
    let expected = Utf8PathBuf::from(PROJECT).join(dir);
    assert_eq!(world.context().bin_dir(), expected.as_path());
}

#[then("the gate denies installation")]
fn then_gate_denies(world: &mut HostWorld) {
    assert!(!DownloadGate.should_allow(world.context()));
}

#[then("the gate allows installation")]
fn then_gate_allows(world: &mut HostWorld) {
    assert!(DownloadGate.should_allow(world.context()));
}

#[then("no version override is set")]
fn then_no_override(world: &mut HostWorld) {
    assert_eq!(world.context().version_override(), None);
}

#[then("the version override is \"{version}\"")]
fn then_override(world: &mut HostWorld, version: String) {
    assert_eq!(world.context().version_override(), Some(version.as_str()));
}

#[scenario(
    path = "tests/features/host_settings.feature",
    name = "Environment chooses the binary directory"
)]
fn scenario_env_bin_dir(world: HostWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_settings.feature",
    name = "Command-line flag overrides the environment"
)]
fn scenario_cli_overrides_env(world: HostWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_settings.feature",
    name = "Environment skip flag closes the gate"
)]
fn scenario_env_skip(world: HostWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_settings.feature",
    name = "Blank environment values are ignored"
)]
fn scenario_blank_env(world: HostWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_settings.feature",
    name = "Driver version override from the environment"
)]
fn scenario_env_version(world: HostWorld) {
    let _ = world;
}
