use crate::application::agent::AgentError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),
    #[error("interrupt resolution did not converge after {rounds} resume rounds")]
    NotConverged { rounds: usize },
    #[error("cannot resume a turn without decisions")]
    EmptyDecisions,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Agent(err) => err.user_message(),
            SessionError::Terminal(_) => "Reading from or writing to the terminal failed.".to_string(),
            SessionError::NotConverged { rounds } => format!(
                "Stopped this request: interrupt resolution did not converge after {rounds} rounds."
            ),
            SessionError::EmptyDecisions => {
                "There were no decisions to continue the request with.".to_string()
            }
        }
    }
}
