use crate::infrastructure::http::HttpError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolServiceError {
    #[error("tool service network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("tool service returned HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("tool '{name}' was not found")]
    ToolNotFound { name: String },
    #[error("authorization {id} failed")]
    AuthorizationFailed { id: String },
    #[error("authorization {id} did not complete within {secs}s")]
    AuthorizationTimeout { id: String, secs: u64 },
    #[error("tool service returned invalid response: {0}")]
    InvalidResponse(String),
}

impl From<HttpError> for ToolServiceError {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::Network(err) => ToolServiceError::Network(err),
            HttpError::Status { status, body } => ToolServiceError::Api { status, body },
        }
    }
}

impl ToolServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ToolServiceError::Network(_) => {
                "Could not reach the tool service. Check your network connection.".to_string()
            }
            ToolServiceError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                "The tool service rejected the API key (401). Check ARCADE_API_KEY.".to_string()
            }
            ToolServiceError::Api { status, .. } => {
                format!("The tool service request failed with status {}.", status.as_u16())
            }
            ToolServiceError::ToolNotFound { name } => {
                format!("Tool \"{name}\" is not available from the tool service.")
            }
            ToolServiceError::AuthorizationFailed { .. } => {
                "The authorization was not granted.".to_string()
            }
            ToolServiceError::AuthorizationTimeout { .. } => {
                "The authorization was not completed in time.".to_string()
            }
            ToolServiceError::InvalidResponse(_) => {
                "The tool service returned a response that could not be processed.".to_string()
            }
        }
    }
}
