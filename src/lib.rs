pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, session, terminal, tooling};
pub use config::{AppConfig, ConfigError};
pub use domain::types;
pub use infrastructure::{arcade, http, model};
