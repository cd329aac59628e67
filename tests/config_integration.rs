//! Configuration layering tests.
//!
//! These mutate process environment variables, so they are serialized.

use serial_test::serial;
use std::env;
use std::fs;

use sante_chat::config::AppConfig;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("SANTE_SERVER__PORT");
        env::remove_var("SANTE_SERVER__HOST");
        env::remove_var("SANTE_BOT__CORPUS_PATH");
        env::remove_var("SANTE_CHAT__REMOTE_URL");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("HOST");
        env::remove_var("CORPUS_PATH");
        env::remove_var("CHAT_REMOTE_URL");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["sante-chat"]).expect("defaults load");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.bot.corpus_path, "corpus.json");
    assert!((config.bot.score_threshold - 0.2).abs() < f64::EPSILON);
    assert!(config.chat.remote_url.is_none());
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("SANTE_SERVER__PORT", "9090");
        env::set_var("SANTE_CHAT__REMOTE_URL", "http://bot.internal:8000");
    }

    let config = AppConfig::load_from_args(["sante-chat"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.chat.remote_url.as_deref(),
        Some("http://bot.internal:8000")
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_flags_win_over_env() {
    clear_env_vars();
    unsafe {
        env::set_var("SANTE_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args(["sante-chat", "--port", "4000"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 4000);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("temp dir");
    let file_path = dir.path().join("config.yaml");
    let config_content = r"
server:
  port: 7070
bot:
  score_threshold: 0.5
";
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    let config = AppConfig::load_from_args([
        "sante-chat",
        "--config",
        file_path.to_str().expect("utf-8 path"),
    ])
    .expect("Failed to load config from file");

    assert_eq!(config.server.port, 7070);
    assert!((config.bot.score_threshold - 0.5).abs() < f64::EPSILON);
    // Untouched keys keep their defaults.
    assert_eq!(config.bot.corpus_path, "corpus.json");

    clear_env_vars();
}
