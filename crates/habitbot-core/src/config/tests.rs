use super::*;
use crate::error::ErrorKind;

#[test]
fn test_defaults_when_sections_missing() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.telegram.host, "api.telegram.org");
    assert_eq!(cfg.telegram.batch_size, 100);
    assert_eq!(cfg.telegram.poll_timeout_secs, 30);
    assert_eq!(cfg.dialog.inbox_capacity, 16);
    assert!(cfg.api.enabled);
    assert_eq!(cfg.api.port, 8000);
    assert_eq!(cfg.store.db_path, "~/.habitbot/data/habits.db");
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let toml_str = r#"
        [telegram]
        bot_token = "123:abc"
        batch_size = 10
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.telegram.bot_token, "123:abc");
    assert_eq!(cfg.telegram.batch_size, 10);
    assert_eq!(cfg.telegram.idle_backoff_ms, 1000);
    assert_eq!(cfg.telegram.max_backoff_secs, 60);
}

#[test]
fn test_validate_rejects_empty_token() {
    let cfg = Config::default();
    let err = cfg.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains(TOKEN_ENV));
}

#[test]
fn test_validate_rejects_zero_batch() {
    let mut cfg = Config::default();
    cfg.telegram.bot_token = "t".to_string();
    cfg.telegram.batch_size = 0;
    assert!(cfg.validate().is_err());

    cfg.telegram.batch_size = 1;
    cfg.dialog.inbox_capacity = 0;
    assert!(cfg.validate().is_err());

    cfg.dialog.inbox_capacity = 1;
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_env_token_overrides_file() {
    let mut cfg = Config::default();
    cfg.telegram.bot_token = "from-file".to_string();

    cfg.apply_env(Some("   ".to_string()));
    assert_eq!(cfg.telegram.bot_token, "from-file");

    cfg.apply_env(None);
    assert_eq!(cfg.telegram.bot_token, "from-file");

    cfg.apply_env(Some("from-env".to_string()));
    assert_eq!(cfg.telegram.bot_token, "from-env");
}

#[test]
fn test_read_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = read(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(cfg.bot.name, "habitbot");
}

#[test]
fn test_read_file_and_reject_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("config.toml");
    std::fs::write(&good, "[api]\nport = 9100\napi_key = \"secret\"\n").unwrap();
    let cfg = read(&good).unwrap();
    assert_eq!(cfg.api.port, 9100);
    assert_eq!(cfg.api.api_key, "secret");

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[api\nport = ").unwrap();
    let err = read(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_shellexpand_leaves_plain_paths() {
    assert_eq!(shellexpand("/var/lib/habits.db"), "/var/lib/habits.db");
    assert_eq!(shellexpand(":memory:"), ":memory:");
}
