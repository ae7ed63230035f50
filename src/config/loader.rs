use super::defaults::*;
use super::error::ConfigError;
use super::{AppConfig, ApprovalConfig, Credentials};
use dotenvy::dotenv;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct RawConfig {
    pub thread_id: Option<String>,
    pub system_prompt: Option<String>,
    pub toolkits: Option<Vec<String>>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub tool_limit: Option<usize>,
    pub max_resume_rounds: Option<usize>,
    pub max_steps: Option<usize>,
    pub authorization_timeout_secs: Option<u64>,
    #[serde(default)]
    pub approval: RawApproval,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct RawApproval {
    #[serde(default)]
    pub tools: Vec<String>,
    pub verbs: Option<Vec<String>>,
    #[serde(default)]
    pub exempt: Vec<String>,
}

/// Loads `.env` from the working directory once per process.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if let Ok(path) = dotenv() {
            debug!(path = %path.display(), "Loaded environment from .env");
        }
    });
}

/// Builds the configuration from the process environment and the config file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let lookup = |key: &str| std::env::var(key).ok();
    match lookup(CONFIG_PATH_ENV).filter(|value| !value.trim().is_empty()) {
        Some(path) => load_with(Some(Path::new(&path)), lookup),
        None => load_with(None, lookup),
    }
}

/// Builds the configuration from an explicit file path (or the default path)
/// and an environment lookup function.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = read_credentials(&lookup)?;
    let raw = match path {
        Some(path) => read_file(path)?,
        None => match read_file(Path::new(DEFAULT_CONFIG_PATH)) {
            Ok(raw) => raw,
            Err(ConfigError::NotFound { .. }) => {
                info!("Configuration file not found; using defaults");
                RawConfig::default()
            }
            Err(other) => return Err(other),
        },
    };
    build(raw, credentials)
}

fn read_credentials<F>(lookup: &F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |name: &'static str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingEnv { name })
    };
    let optional = |name: &str, default: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(Credentials {
        arcade_user_id: required(ARCADE_USER_ID_ENV)?,
        model: required(OPENAI_MODEL_ENV)?,
        arcade_api_key: required(ARCADE_API_KEY_ENV)?,
        openai_api_key: required(OPENAI_API_KEY_ENV)?,
        arcade_base_url: optional(ARCADE_BASE_URL_ENV, DEFAULT_ARCADE_BASE_URL),
        openai_base_url: optional(OPENAI_BASE_URL_ENV, DEFAULT_OPENAI_BASE_URL),
    })
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

fn build(raw: RawConfig, credentials: Credentials) -> Result<AppConfig, ConfigError> {
    let tool_limit = positive("tool_limit", raw.tool_limit.unwrap_or(DEFAULT_TOOL_LIMIT))?;
    let max_resume_rounds = positive(
        "max_resume_rounds",
        raw.max_resume_rounds.unwrap_or(DEFAULT_MAX_RESUME_ROUNDS),
    )?;
    let max_steps = positive("max_steps", raw.max_steps.unwrap_or(DEFAULT_MAX_STEPS))?;
    let timeout_secs = raw
        .authorization_timeout_secs
        .unwrap_or(DEFAULT_AUTHORIZATION_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "authorization_timeout_secs",
            reason: "must be greater than zero".into(),
        });
    }

    let toolkits = raw
        .toolkits
        .unwrap_or_else(|| DEFAULT_TOOLKITS.iter().map(|s| s.to_string()).collect());
    if toolkits.is_empty() && raw.tools.is_empty() {
        return Err(ConfigError::Invalid {
            field: "toolkits",
            reason: "at least one toolkit or tool must be configured".into(),
        });
    }

    let thread_id = raw
        .thread_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(AppConfig {
        credentials,
        thread_id,
        system_prompt: raw
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        toolkits,
        tools: raw.tools,
        tool_limit,
        max_resume_rounds,
        max_steps,
        authorization_timeout: Duration::from_secs(timeout_secs),
        approval: ApprovalConfig {
            tools: raw.approval.tools,
            verbs: raw
                .approval
                .verbs
                .unwrap_or_else(|| DEFAULT_APPROVAL_VERBS.iter().map(|s| s.to_string()).collect()),
            exempt: raw.approval.exempt,
        },
    })
}

fn positive(field: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".into(),
        })
    } else {
        Ok(value)
    }
}
