//! Tests for layered configuration loading.

use std::path::PathBuf;
use tempfile::TempDir;
use warden::{ActorId, WardenConfig};

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("warden.toml");
    std::fs::write(&path, body).expect("write config");
    path
}

#[test]
fn test_bundled_defaults_match_default_impl() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "");

    let config = WardenConfig::load_from(Some(&path)).expect("load");
    assert_eq!(config, WardenConfig::default());
    assert_eq!(config.command_prefix(), "!");
    assert_eq!(config.log_channel(), "security-logs");
    assert_eq!(*config.audit().max_entry_age_secs(), 60);
    assert_eq!(*config.spam().window_secs(), 5);
    assert_eq!(*config.spam().max_messages(), 5);
    assert_eq!(*config.policy().mention_timeout_secs(), 3600);
    assert_eq!(*config.policy().beneficiary_timeout_secs(), 86400);
    assert_eq!(*config.snapshot().interval_secs(), 600);
}

#[test]
fn test_file_overrides_individual_values() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
owner_id = 42
command_prefix = "?"

[spam]
max_messages = 8

[enforcement]
notify_before_ban = true
"#,
    );

    let config = WardenConfig::load_from(Some(&path)).expect("load");
    assert_eq!(config.owner().expect("owner"), ActorId::new(42));
    assert_eq!(config.command_prefix(), "?");
    assert_eq!(*config.spam().max_messages(), 8);
    assert_eq!(*config.spam().window_secs(), 5, "untouched values keep defaults");
    assert!(*config.enforcement().notify_before_ban());
    assert_eq!(config.log_channel(), "security-logs");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.toml");
    assert!(WardenConfig::load_from(Some(&path)).is_err());
}

#[test]
fn test_wrong_value_type_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "[spam]\nmax_messages = \"lots\"\n");
    assert!(WardenConfig::load_from(Some(&path)).is_err());
}

#[test]
fn test_owner_is_required() {
    let config = WardenConfig::default();
    assert!(config.owner().is_err());

    let zero = WardenConfig::default().with_owner_id(Some(0));
    assert!(zero.owner().is_err());

    let set = WardenConfig::default().with_owner_id(Some(7));
    assert_eq!(set.owner().expect("owner"), ActorId::new(7));
}

#[test]
fn test_summary_lists_effective_values() {
    let config = WardenConfig::default().with_owner_id(Some(7));
    let summary = config.summary();

    let value = |name: &str| {
        summary
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(value("owner"), Some("7".to_string()));
    assert_eq!(value("command prefix"), Some("!".to_string()));
    assert_eq!(
        value("spam threshold"),
        Some("more than 5 messages in 5s".to_string())
    );
    assert_eq!(value("snapshot path"), Some("server_backup.json".to_string()));
}
