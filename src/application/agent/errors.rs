use super::checkpoint::CheckpointError;
use crate::application::tooling::ToolServiceError;
use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    ToolService(#[from] ToolServiceError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("there is no interrupted tool call to resume")]
    NothingToResume,
    #[error("expected {expected} decision(s) to resume, received {received}")]
    ResumeMismatch { expected: usize, received: usize },
    #[error("agent stopped after {limit} model calls without a final answer")]
    StepLimit { limit: usize },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::ToolService(err) => err.user_message(),
            AgentError::Checkpoint(_) => {
                "The conversation state could not be saved or restored.".to_string()
            }
            AgentError::NothingToResume => {
                "There is no pending tool call waiting for a decision.".to_string()
            }
            AgentError::ResumeMismatch { expected, received } => format!(
                "Expected {expected} decision(s) for the pending tool calls but got {received}."
            ),
            AgentError::StepLimit { limit } => format!(
                "The agent did not reach an answer within {limit} steps. Try a more specific request."
            ),
        }
    }
}
