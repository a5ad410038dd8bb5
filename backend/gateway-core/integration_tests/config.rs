use gateway_core::config::{GatewayConfig, GatewayMode};
use gateway_core::error::config::ConfigError;

use std::fs;
use std::time::Duration;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies a missing config file yields defaults.
///
/// **WHY THIS MATTERS**: First start has no config; the gateway must come up anyway.
///
/// **BUG THIS CATCHES**: Would catch `load()` erroring on a missing file.
#[test]
fn given_empty_dir_when_loading_then_returns_defaults() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().expect("temp dir");

    // WHEN: Loading
    let config = GatewayConfig::load(dir.path()).expect("should load defaults");

    // THEN: Defaults
    assert_eq!(config, GatewayConfig::default());
}

/// **VALUE**: Verifies save then load preserves every field, including humantime delays.
///
/// **WHY THIS MATTERS**: Onboarding writes the config that the next gateway start reads.
///
/// **BUG THIS CATCHES**: Would catch a serde adapter that writes a delay it cannot read back.
#[test]
fn given_saved_config_when_loaded_then_round_trips() {
    // GIVEN: A customised config
    let dir = TempDir::new().expect("temp dir");
    let mut config = GatewayConfig::default();
    config.gateway.port = 20001;
    config.gateway.mode = GatewayMode::Remote;
    config.listen.max_retries = 3;
    config.listen.base_delay = Duration::from_millis(250);
    config.agents.defaults.workspace = Some(String::from("~/agent"));
    config.logging.level = Some(LevelFilter::Warn);

    // WHEN: Saving then loading
    config.save(dir.path()).expect("should save");
    let loaded = GatewayConfig::load(dir.path()).expect("should load");

    // THEN: Identical, with the delay written as a humantime string
    assert_eq!(loaded, config);
    let written = fs::read_to_string(dir.path().join("config.json")).expect("config written");
    assert!(written.contains("\"250ms\""), "Delay should be human readable: {written}");
    assert!(!dir.path().join("config.json.tmp").exists(), "Temp file should be renamed");
}

/// **VALUE**: Verifies partial files are filled from defaults.
///
/// **WHY THIS MATTERS**: Hand-edited configs usually only set the port.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` on a section or field.
#[test]
fn given_partial_config_when_loading_then_missing_fields_use_defaults() {
    // GIVEN: A config that only sets the port and base delay
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("config.json"),
        r#"{
            "gateway": {"port": 19000},
            "listen": {"base_delay": "2s"},
            "logging": {"modules": {"gateway_core::replay": "trace"}}
        }"#,
    )
    .expect("write config");

    // WHEN: Loading
    let config = GatewayConfig::load(dir.path()).expect("should load");

    // THEN: Set values are used, others default
    assert_eq!(config.gateway.port, 19000);
    assert_eq!(config.gateway.bind_host, "127.0.0.1");
    assert_eq!(config.listen.base_delay, Duration::from_secs(2));
    assert_eq!(config.listen.max_retries, 5);
    assert_eq!(config.logging.level, None);
    assert_eq!(
        config.logging.modules.get("gateway_core::replay"),
        Some(&LevelFilter::Trace)
    );
}

/// **VALUE**: Verifies corrupt and invalid files are reported, not silently defaulted.
///
/// **WHY THIS MATTERS**: Silently ignoring a broken config would start the gateway on a port
/// the operator did not choose.
///
/// **BUG THIS CATCHES**: Would catch parse or validation errors being swallowed.
#[test]
fn given_corrupt_or_invalid_config_when_loading_then_returns_error() {
    // GIVEN: A corrupt file
    let corrupt = TempDir::new().expect("temp dir");
    fs::write(corrupt.path().join("config.json"), "{ not json").expect("write config");

    // GIVEN: A file with an unparseable delay
    let bad_delay = TempDir::new().expect("temp dir");
    fs::write(
        bad_delay.path().join("config.json"),
        r#"{"listen": {"base_delay": "soon"}}"#,
    )
    .expect("write config");

    // GIVEN: A file that parses but fails validation
    let invalid = TempDir::new().expect("temp dir");
    fs::write(invalid.path().join("config.json"), r#"{"gateway": {"port": 0}}"#)
        .expect("write config");

    // THEN: Parse errors for the first two, validation error for the last
    let corrupt_err = GatewayConfig::load(corrupt.path()).expect_err("corrupt file");
    assert!(matches!(corrupt_err, ConfigError::Format { .. }));
    assert_eq!(
        corrupt_err.path(),
        Some(corrupt.path().join("config.json").as_path())
    );
    assert!(matches!(
        GatewayConfig::load(bad_delay.path()),
        Err(ConfigError::Format { .. })
    ));
    assert!(matches!(
        GatewayConfig::load(invalid.path()),
        Err(ConfigError::Invalid { .. })
    ));
}

/// **VALUE**: Verifies invalid configs are never written.
///
/// **WHY THIS MATTERS**: A written-but-invalid config would fail the next startup.
///
/// **BUG THIS CATCHES**: Would catch `save()` skipping validation.
#[test]
fn given_invalid_config_when_saving_then_returns_error_and_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = GatewayConfig::default();
    config.listen.max_retries = 100;

    let result = config.save(dir.path());

    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    assert!(!dir.path().join("config.json").exists());
}
