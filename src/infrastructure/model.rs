use super::http::{HttpClientBase, HttpError};
use crate::types::{ChatMessage, MessageRole, ToolCall, ToolSpec};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model provider returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("model provider returned invalid response: {0}")]
    InvalidResponse(String),
}

impl From<HttpError> for ModelError {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::Network(err) => ModelError::Network(err),
            HttpError::Status { status, body } => ModelError::Status { status, body },
        }
    }
}

impl ModelError {
    pub fn user_message(&self) -> String {
        match self {
            ModelError::Network(err) if err.is_connect() => {
                "Could not reach the model provider. Check your network connection.".to_string()
            }
            ModelError::Network(err) if err.is_timeout() => {
                "The model provider took too long to answer. Try again shortly.".to_string()
            }
            ModelError::Network(_) => {
                "A network error occurred while contacting the model provider.".to_string()
            }
            ModelError::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => {
                    "The model provider rejected the API key (401). Check OPENAI_API_KEY."
                        .to_string()
                }
                StatusCode::NOT_FOUND => {
                    "The requested model was not found (404). Check OPENAI_MODEL.".to_string()
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    "The model provider is rate limiting requests. Try again later.".to_string()
                }
                other => format!(
                    "The model request failed with status {}. Try again later.",
                    other.as_u16()
                ),
            },
            ModelError::InvalidResponse(_) => {
                "The model provider returned a response that could not be processed.".to_string()
            }
        }
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// Removes a `provider:` prefix such as `openai:gpt-4o`.
pub fn normalize_model_id(model: &str) -> &str {
    let trimmed = model.trim();
    trimmed
        .strip_prefix("openai:")
        .unwrap_or(trimmed)
}

/// OpenAI chat-completions client with function calling.
#[derive(Clone)]
pub struct OpenAiClient {
    base: HttpClientBase,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base: HttpClientBase::new(base_url, api_key),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiClient {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let payload = OpenAiChatRequest::from(&request);
        info!(
            model = payload.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to model provider"
        );
        let response: OpenAiChatResponse = self
            .base
            .post_json(CHAT_COMPLETIONS_PATH, &payload)
            .await?;
        debug!("Received response from model provider");

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ModelError::InvalidResponse("missing choices".into()))?;

        Ok(ModelResponse {
            message: message.into_chat_message()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool>,
}

impl From<&ModelRequest> for OpenAiChatRequest {
    fn from(value: &ModelRequest) -> Self {
        Self {
            model: normalize_model_id(&value.model).to_string(),
            messages: value.messages.iter().map(OpenAiMessage::from).collect(),
            tools: value
                .tools
                .iter()
                .map(|spec| OpenAiTool {
                    kind: "function".into(),
                    function: OpenAiFunction {
                        name: spec.name.clone(),
                        description: spec.description.clone(),
                        parameters: spec.parameters.clone(),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(value: &ChatMessage) -> Self {
        let content = if value.content.is_empty() && !value.tool_calls.is_empty() {
            None
        } else {
            Some(value.content.clone())
        };
        Self {
            role: value.role.as_str().to_string(),
            content,
            tool_calls: value
                .tool_calls
                .iter()
                .map(|call| OpenAiToolCall {
                    id: call.id.clone(),
                    kind: "function".into(),
                    function: OpenAiFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: value.tool_call_id.clone(),
        }
    }
}

impl OpenAiMessage {
    fn into_chat_message(self) -> Result<ChatMessage, ModelError> {
        let role = MessageRole::parse(&self.role)
            .ok_or_else(|| ModelError::InvalidResponse(format!("unknown role {}", self.role)))?;
        let mut tool_calls = Vec::with_capacity(self.tool_calls.len());
        for call in self.tool_calls {
            let arguments = if call.function.arguments.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|err| {
                    ModelError::InvalidResponse(format!(
                        "arguments for {} are not valid JSON: {err}",
                        call.function.name
                    ))
                })?
            };
            tool_calls.push(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            });
        }
        let mut message = ChatMessage::new(role, self.content.unwrap_or_default());
        message.tool_calls = tool_calls;
        Ok(message)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: OpenAiFunctionCall,
}

fn function_kind() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn strips_provider_prefix() {
        assert_eq!(normalize_model_id("openai:gpt-4o"), "gpt-4o");
        assert_eq!(normalize_model_id(" gpt-4o-mini "), "gpt-4o-mini");
    }

    #[test]
    fn request_conversion_serializes_tool_calls() {
        let request = ModelRequest {
            model: "openai:gpt-4o".into(),
            messages: vec![
                ChatMessage::new(MessageRole::System, "be brief"),
                ChatMessage::assistant(
                    "",
                    vec![ToolCall {
                        id: "call_1".into(),
                        name: "Linear_GetIssue".into(),
                        arguments: json!({"issue_id": "TOO-1"}),
                    }],
                ),
            ],
            tools: vec![ToolSpec {
                name: "Linear_GetIssue".into(),
                description: "Get an issue".into(),
                parameters: json!({"type": "object", "properties": {}}),
            }],
        };
        let payload = serde_json::to_value(OpenAiChatRequest::from(&request)).expect("serialize");
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert!(payload["messages"][1]["content"].is_null());
        assert_eq!(
            payload["messages"][1]["tool_calls"][0]["function"]["arguments"],
            r#"{"issue_id":"TOO-1"}"#
        );
        assert_eq!(payload["tools"][0]["type"], "function");
    }

    #[tokio::test]
    async fn parses_tool_call_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_7",
                            "type": "function",
                            "function": {"name": "Linear_WhoAmI", "arguments": "{}"}
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(server.uri(), "sk-test");
        let response = client
            .chat(ModelRequest {
                model: "gpt-4o".into(),
                messages: vec![ChatMessage::user("who am I?")],
                tools: Vec::new(),
            })
            .await
            .expect("chat succeeds");

        assert_eq!(response.message.role, MessageRole::Assistant);
        assert_eq!(response.message.tool_calls.len(), 1);
        assert_eq!(response.message.tool_calls[0].name, "Linear_WhoAmI");
        assert_eq!(response.message.tool_calls[0].arguments, json!({}));
    }

    #[tokio::test]
    async fn surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(server.uri(), "sk-wrong");
        let error = client
            .chat(ModelRequest {
                model: "gpt-4o".into(),
                messages: vec![ChatMessage::user("hi")],
                tools: Vec::new(),
            })
            .await
            .expect_err("401 fails");
        assert!(matches!(error, ModelError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
        assert!(error.user_message().contains("OPENAI_API_KEY"));
    }
}
