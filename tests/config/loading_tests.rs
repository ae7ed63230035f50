// Config loading tests - AppConfig::load against the real process environment
//
// Every test here mutates process-wide environment variables, so they run
// serially and restore what they touched.

use linear_agent::config::{AppConfig, ConfigError};
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

const VARS: &[&str] = &[
    "ARCADE_USER_ID",
    "OPENAI_MODEL",
    "ARCADE_API_KEY",
    "OPENAI_API_KEY",
    "ARCADE_BASE_URL",
    "OPENAI_BASE_URL",
    "LINEAR_AGENT_CONFIG",
];

struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        let saved = VARS.iter().map(|name| (*name, std::env::var(name).ok())).collect();
        unsafe {
            for name in VARS {
                std::env::remove_var(name);
            }
            for (name, value) in pairs {
                std::env::set_var(name, value);
            }
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            for (name, value) in &self.saved {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}

const REQUIRED: &[(&str, &str)] = &[
    ("ARCADE_USER_ID", "dev@example.com"),
    ("OPENAI_MODEL", "openai:gpt-4o"),
    ("ARCADE_API_KEY", "arc_test"),
    ("OPENAI_API_KEY", "sk-test"),
];

#[test]
#[serial]
fn missing_user_id_fails_with_env_hint() {
    let _env = EnvGuard::set(&[("OPENAI_MODEL", "gpt-4o")]);

    let err = AppConfig::load().expect_err("user id is required");
    assert!(matches!(err, ConfigError::MissingEnv { name: "ARCADE_USER_ID" }));
    assert_eq!(
        err.to_string(),
        "Missing ARCADE_USER_ID. Add it to your .env file."
    );
}

#[test]
#[serial]
fn missing_model_fails_before_anything_else() {
    let _env = EnvGuard::set(&[("ARCADE_USER_ID", "dev@example.com")]);

    let err = AppConfig::load().expect_err("model is required");
    assert!(matches!(err, ConfigError::MissingEnv { name: "OPENAI_MODEL" }));
}

#[test]
#[serial]
fn defaults_apply_without_a_config_file() {
    let _env = EnvGuard::set(REQUIRED);

    let config = AppConfig::load().expect("config loads");
    assert_eq!(config.toolkits, vec!["Linear"]);
    assert!(config.tools.is_empty());
    assert_eq!(config.tool_limit, 100);
    assert_eq!(config.max_resume_rounds, 16);
    assert_eq!(config.max_steps, 25);
    assert_eq!(config.authorization_timeout.as_secs(), 600);
    assert_eq!(config.credentials.model, "openai:gpt-4o");
    assert_eq!(config.credentials.arcade_base_url, "https://api.arcade.dev");
    assert_eq!(config.credentials.openai_base_url, "https://api.openai.com");
    assert!(!config.thread_id.is_empty());
    assert!(config.approval.verbs.iter().any(|v| v == "Archive"));
}

#[test]
#[serial]
fn config_path_and_base_urls_come_from_the_environment() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("agent.toml");
    fs::write(
        &path,
        r#"
thread_id = "1"
authorization_timeout_secs = 30

[approval]
tools = ["Linear_AddComment"]
"#,
    )
    .expect("write config");
    let path_text = path.to_string_lossy().to_string();

    let mut pairs: Vec<(&'static str, &str)> = REQUIRED.to_vec();
    pairs.push(("LINEAR_AGENT_CONFIG", path_text.as_str()));
    pairs.push(("ARCADE_BASE_URL", "http://127.0.0.1:9099"));
    let _env = EnvGuard::set(&pairs);

    let config = AppConfig::load().expect("config loads");
    assert_eq!(config.thread_id, "1");
    assert_eq!(config.authorization_timeout.as_secs(), 30);
    assert_eq!(config.approval.tools, vec!["Linear_AddComment"]);
    assert_eq!(config.credentials.arcade_base_url, "http://127.0.0.1:9099");
}

#[test]
#[serial]
fn configured_path_that_does_not_exist_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    let missing_text = missing.to_string_lossy().to_string();

    let mut pairs: Vec<(&'static str, &str)> = REQUIRED.to_vec();
    pairs.push(("LINEAR_AGENT_CONFIG", missing_text.as_str()));
    let _env = EnvGuard::set(&pairs);

    assert!(matches!(
        AppConfig::load(),
        Err(ConfigError::NotFound { .. })
    ));
}
