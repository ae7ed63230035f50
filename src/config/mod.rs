pub mod defaults;
pub mod error;
pub mod loader;

use std::path::Path;
use std::time::Duration;

pub use error::ConfigError;

/// Secrets and endpoints read from the process environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub arcade_user_id: String,
    pub model: String,
    pub arcade_api_key: String,
    pub openai_api_key: String,
    pub arcade_base_url: String,
    pub openai_base_url: String,
}

/// Which tool calls must be confirmed by the operator before they run.
#[derive(Debug, Clone, Default)]
pub struct ApprovalConfig {
    pub tools: Vec<String>,
    pub verbs: Vec<String>,
    pub exempt: Vec<String>,
}

/// Application configuration, built once at startup and passed down by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub thread_id: String,
    pub system_prompt: String,
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub tool_limit: usize,
    pub max_resume_rounds: usize,
    pub max_steps: usize,
    pub authorization_timeout: Duration,
    pub approval: ApprovalConfig,
}

impl AppConfig {
    /// Loads `.env`, then reads the environment and the optional config file.
    pub fn load() -> Result<Self, ConfigError> {
        loader::load_config()
    }

    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        loader::load_with(path, lookup)
    }
}
