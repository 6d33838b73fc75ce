//! Tests for config functionality.

use crate::config::{Config, JobKeyConfig, StoreBackend};
use crate::key::KeyDeriver;
use crate::locks::ReleaseMode;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.namespace, "locked:");
    assert!(config.jobs.is_empty());
    assert_eq!(config.store.backend, StoreBackend::File);
    assert_eq!(config.store.dir, ".joblock/locks");
    assert_eq!(config.store.redis_url, "redis://127.0.0.1/");
    assert_eq!(config.lock_stale_minutes, 120);
    assert_eq!(config.release_mode, ReleaseMode::Unconditional);
    assert!(config.record_events);
    assert_eq!(config.events_file, ".joblock/events.ndjson");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    assert_eq!(config.namespace, "locked:");
    assert_eq!(config.lock_stale_minutes, 120);
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
lock_stale_minutes: 30
store:
  dir: /var/lib/joblock
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lock_stale_minutes, 30);
    assert_eq!(config.store.dir, "/var/lib/joblock");

    // Unspecified values should use defaults
    assert_eq!(config.store.backend, StoreBackend::File);
    assert_eq!(config.store.redis_url, "redis://127.0.0.1/");
    assert_eq!(config.namespace, "locked:");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
namespace: "jobs:lock:"
jobs:
  NightlyReport:
    constant: true
  SyncAccount:
    key_args: [0]
store:
  backend: redis
  dir: ""
  redis_url: redis://cache:6379/2
lock_stale_minutes: 15
release_mode: owner_checked
record_events: false
events_file: /tmp/joblock.ndjson
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.namespace, "jobs:lock:");
    assert!(config.jobs["NightlyReport"].constant);
    assert_eq!(config.jobs["SyncAccount"].key_args, Some(vec![0]));
    assert_eq!(config.store.backend, StoreBackend::Redis);
    assert_eq!(config.store.redis_url, "redis://cache:6379/2");
    assert_eq!(config.lock_stale_minutes, 15);
    assert_eq!(config.release_mode, ReleaseMode::OwnerChecked);
    assert!(!config.record_events);
    assert_eq!(config.events_file, "/tmp/joblock.ndjson");
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
lock_stale_minutes: 10
some_future_setting: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.lock_stale_minutes, 10);
}

#[test]
fn test_validation_rejects_zero_stale_minutes() {
    let err = Config::from_yaml("lock_stale_minutes: 0").unwrap_err();
    assert!(err.to_string().contains("lock_stale_minutes"));
}

#[test]
fn test_validation_rejects_empty_namespace() {
    let err = Config::from_yaml(r#"namespace: """#).unwrap_err();
    assert!(err.to_string().contains("namespace"));
}

#[test]
fn test_validation_rejects_empty_file_dir() {
    let yaml = r#"
store:
  backend: file
  dir: "  "
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("store.dir"));
}

#[test]
fn test_validation_rejects_conflicting_job_override() {
    let yaml = r#"
jobs:
  Job:
    constant: true
    key_args: [1]
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("'Job'"));
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("lock_stale_minutes: [").unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
}

#[test]
fn test_yaml_round_trip() {
    let mut config = Config::default();
    config.lock_stale_minutes = 45;
    config.jobs.insert(
        "SyncAccount".to_string(),
        JobKeyConfig {
            constant: false,
            key_args: Some(vec![0, 2]),
        },
    );

    let yaml = config.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();

    assert_eq!(parsed.lock_stale_minutes, 45);
    assert_eq!(parsed.jobs, config.jobs);
}

#[test]
fn test_load_or_default_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_or_default(temp_dir.path().join("joblock.yaml")).unwrap();
    assert_eq!(config.lock_stale_minutes, 120);
}

#[test]
fn test_load_or_default_reads_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("joblock.yaml");
    std::fs::write(&path, "lock_stale_minutes: 7\n").unwrap();

    assert_eq!(Config::load_or_default(&path).unwrap().lock_stale_minutes, 7);
}

#[test]
fn test_load_reports_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(temp_dir.path().join("nope.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_deriver_registry_applies_job_overrides() {
    let yaml = r#"
jobs:
  NightlyReport:
    constant: true
  SyncAccount:
    key_args: [0]
"#;
    let registry = Config::from_yaml(yaml).unwrap().deriver_registry();

    assert_eq!(
        registry.derive_key("NightlyReport", &[json!(1)]).as_str(),
        "locked:NightlyReport"
    );
    assert_eq!(
        registry
            .derive_key("SyncAccount", &[json!("a"), json!(5)])
            .as_str(),
        r#"locked:SyncAccount-["a"]"#
    );
    assert_eq!(
        registry.derive_key("Other", &[json!(1)]).as_str(),
        "locked:Other-[1]"
    );
}
