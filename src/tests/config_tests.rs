//! Tests for the configuration module.
//!
//! Loading from files and environment, validation, and TOML generation.

use crate::config::{ConfigLoader, TablesConfig, Validate};
use crate::data_structures::CapacityMode;
use crate::error::ConfigError;

use super::TestFixture;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = TablesConfig::default();
    assert!(config.validate().is_ok());
}

/// Test that configuration validation catches invalid values.
#[test]
fn test_config_validation() {
    let mut config = TablesConfig::default();

    config.nalu.capacity = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValueOutOfRange { ref key, .. }) if key == "nalu.capacity"
    ));

    config.nalu.capacity = 8;
    config.moana.load_factor = 1.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValueOutOfRange { ref key, .. }) if key == "moana.load_factor"
    ));

    config.moana.load_factor = 0.5;
    config.log.level = "loud".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

    config.log.level = "debug".to_string();
    config.bloom.false_positive_rate = 0.0;
    assert!(config.validate().is_err());

    config.bloom.false_positive_rate = 0.05;
    config.workload.key_space = 0;
    assert!(config.validate().is_err());

    config.workload.key_space = 10;
    assert!(config.validate().is_ok());
}

/// Test loading configuration from a TOML file.
#[test]
fn test_load_config_from_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file(
            "tables.toml",
            r#"
            [log]
            level = "debug"

            [nalu]
            capacity = 32
            mode = "fixed"

            [puka]
            initial_capacity = 128
            max_probe_distance = 16

            [hashing]
            randomized = true
            collision_threshold = 12
            "#,
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_FILE").load().unwrap();

    assert_eq!(config.log.level, "debug");
    assert_eq!(config.nalu.capacity, 32);
    assert_eq!(config.nalu.mode, CapacityMode::Fixed);
    assert_eq!(config.puka.initial_capacity, 128);
    assert_eq!(config.puka.max_probe_distance, 16);
    assert!(config.hashing.randomized);
    assert_eq!(config.hashing.collision_threshold, Some(12));

    // untouched sections keep their defaults
    let defaults = TablesConfig::default();
    assert_eq!(config.lei.capacity, defaults.lei.capacity);
    assert_eq!(config.workload.operations, defaults.workload.operations);
}

/// Test loading configuration from a JSON file.
#[test]
fn test_load_config_from_json() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file(
            "tables.json",
            r#"{ "moana": { "capacity": 7, "mode": "dynamic" }, "workload": { "threads": 2 } }"#,
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_JSON").load().unwrap();
    assert_eq!(config.moana.capacity, 7);
    assert_eq!(config.moana.mode, CapacityMode::Dynamic);
    assert_eq!(config.workload.thread_count(), 2);
}

/// Test loading configuration with environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("tables.toml", "[lei]\ncapacity = 10\n")
        .unwrap();

    fixture.set_env("TEST_ENV__LEI__CAPACITY", "99");
    fixture.set_env("TEST_ENV__LEI__MODE", "dynamic");

    let config = ConfigLoader::new(Some(&path), "TEST_ENV").load().unwrap();

    assert_eq!(config.lei.capacity, 99);
    assert_eq!(config.lei.mode, CapacityMode::Dynamic);
}

/// Test that loading an invalid configuration file returns an error.
#[test]
fn test_load_invalid_config() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("invalid.toml", "[nalu\ncapacity = ")
        .unwrap();

    let result = ConfigLoader::new(Some(&path), "TEST_INVALID").load();
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

/// Test that a file with an out-of-range value is rejected after merging.
#[test]
fn test_load_rejects_invalid_values() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("zero.toml", "[ohana]\ncapacity = 0\n")
        .unwrap();

    let result = ConfigLoader::new(Some(&path), "TEST_ZERO").load();
    assert!(matches!(
        result,
        Err(ConfigError::ValueOutOfRange { ref key, .. }) if key == "ohana.capacity"
    ));
}

#[test]
fn test_missing_and_unsupported_files() {
    let fixture = TestFixture::new().unwrap();

    let missing = fixture.temp_dir.path().join("absent.toml");
    let result = ConfigLoader::new(Some(&missing), "TEST_MISSING").load();
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

    let ini = fixture.write_file("tables.ini", "capacity=1").unwrap();
    let result = ConfigLoader::new(Some(&ini), "TEST_INI").load();
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

/// Test that a generated configuration loads back unchanged.
#[test]
fn test_generated_config_round_trips() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.temp_dir.path().join("generated.toml");

    let mut original = TablesConfig::default();
    original.nalu.capacity = 3;
    original.bloom.hash_functions = Some(5);
    original.write_toml(&path).unwrap();

    let loaded = ConfigLoader::new(Some(&path), "TEST_GENERATED").load().unwrap();
    assert_eq!(loaded.nalu.capacity, 3);
    assert_eq!(loaded.bloom.hash_functions, Some(5));
    assert_eq!(loaded.hashing.collision_threshold, None);
    assert_eq!(loaded.workload.threads, None);
}
