//! HTTP client for the Arcade tool service.

use super::http::HttpClientBase;
use crate::application::tooling::{
    AuthorizationResponse, AuthorizationStatus, AuthorizationWaiter, ExecuteToolResponse,
    ToolBackend, ToolCatalog, ToolDefinition, ToolPage, ToolServiceError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Seconds the service may hold a status request open.
const STATUS_WAIT_SECS: u64 = 59;
const POLL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct ArcadeClient {
    base: HttpClientBase,
    authorization_timeout: Duration,
}

impl ArcadeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        authorization_timeout: Duration,
    ) -> Self {
        Self {
            base: HttpClientBase::new(base_url, api_key),
            authorization_timeout,
        }
    }
}

#[derive(Serialize)]
struct AuthorizeRequest<'a> {
    tool_name: &'a str,
    user_id: &'a str,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    tool_name: &'a str,
    input: Value,
    user_id: &'a str,
}

#[async_trait]
impl ToolCatalog for ArcadeClient {
    async fn list_tools(
        &self,
        toolkit: &str,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ToolPage, ToolServiceError> {
        debug!(toolkit, limit, offset, "Listing tools");
        let query = [
            ("toolkit", toolkit.to_string()),
            ("user_id", user_id.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        Ok(self.base.get_json("/v1/tools", &query).await?)
    }

    async fn get_tool(&self, name: &str, user_id: &str) -> Result<ToolDefinition, ToolServiceError> {
        debug!(tool = name, "Fetching tool definition");
        let query = [("user_id", user_id.to_string())];
        match self.base.get_json(&format!("/v1/tools/{name}"), &query).await {
            Ok(tool) => Ok(tool),
            Err(err) => match ToolServiceError::from(err) {
                ToolServiceError::Api { status, .. } if status == StatusCode::NOT_FOUND => {
                    Err(ToolServiceError::ToolNotFound {
                        name: name.to_string(),
                    })
                }
                other => Err(other),
            },
        }
    }
}

#[async_trait]
impl ToolBackend for ArcadeClient {
    async fn authorize(
        &self,
        tool: &str,
        user_id: &str,
    ) -> Result<AuthorizationResponse, ToolServiceError> {
        let response: AuthorizationResponse = self
            .base
            .post_json(
                "/v1/tools/authorize",
                &AuthorizeRequest {
                    tool_name: tool,
                    user_id,
                },
            )
            .await?;
        debug!(tool, status = ?response.status, "Authorization checked");
        Ok(response)
    }

    async fn execute(
        &self,
        tool: &str,
        input: Value,
        user_id: &str,
    ) -> Result<ExecuteToolResponse, ToolServiceError> {
        info!(tool, "Executing tool");
        Ok(self
            .base
            .post_json(
                "/v1/tools/execute",
                &ExecuteRequest {
                    tool_name: tool,
                    input,
                    user_id,
                },
            )
            .await?)
    }
}

#[async_trait]
impl AuthorizationWaiter for ArcadeClient {
    async fn wait_for_completion(
        &self,
        authorization_id: &str,
    ) -> Result<AuthorizationResponse, ToolServiceError> {
        let deadline = Instant::now() + self.authorization_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(authorization_id, "Authorization wait timed out");
                return Err(ToolServiceError::AuthorizationTimeout {
                    id: authorization_id.to_string(),
                    secs: self.authorization_timeout.as_secs(),
                });
            }
            let wait = remaining.as_secs().clamp(1, STATUS_WAIT_SECS);
            let query = [
                ("id", authorization_id.to_string()),
                ("wait", wait.to_string()),
            ];
            let response: AuthorizationResponse =
                self.base.get_json("/v1/auth/status", &query).await?;
            match response.status {
                AuthorizationStatus::Completed => {
                    info!(authorization_id, "Authorization completed");
                    return Ok(response);
                }
                AuthorizationStatus::Failed => {
                    return Err(ToolServiceError::AuthorizationFailed {
                        id: authorization_id.to_string(),
                    });
                }
                status => {
                    debug!(authorization_id, ?status, "Authorization still pending");
                    sleep(POLL_BACKOFF.min(remaining)).await;
                }
            }
        }
    }
}
