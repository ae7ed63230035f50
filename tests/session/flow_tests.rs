// Session flow tests - full chat loop against a mocked Arcade service
//
// The model is scripted, the tool service is a wiremock server and the
// operator is a console over in-memory input, so each test exercises the
// same wiring the binary uses.

use async_trait::async_trait;
use linear_agent::agent::{AgentOptions, ReactAgent};
use linear_agent::arcade::ArcadeClient;
use linear_agent::config::ApprovalConfig;
use linear_agent::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use linear_agent::session::{InterruptResolver, SessionLoop};
use linear_agent::terminal::ConsoleOperator;
use linear_agent::tooling::{ApprovalPolicy, ToolQuery, get_tools};
use linear_agent::types::{ChatMessage, MessageRole, ToolCall};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "dev@example.com";

#[derive(Clone)]
struct ScriptedProvider {
    replies: Arc<Mutex<Vec<ChatMessage>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ChatMessage>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.recordings.lock().await.push(request);
        let mut replies = self.replies.lock().await;
        if replies.is_empty() {
            return Err(ModelError::InvalidResponse("no scripted reply left".into()));
        }
        Ok(ModelResponse {
            message: replies.remove(0),
        })
    }
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ChatMessage {
    ChatMessage::assistant(
        "",
        vec![ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }],
    )
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/tools"))
        .and(query_param("toolkit", "Linear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "name": "GetIssue",
                    "qualified_name": "Linear.GetIssue",
                    "description": "Get a Linear issue",
                    "input": {"parameters": [
                        {"name": "issue", "required": true, "value_schema": {"val_type": "string"}}
                    ]},
                    "requirements": {"authorization": {"provider_id": "linear"}}
                },
                {
                    "name": "ArchiveIssue",
                    "qualified_name": "Linear.ArchiveIssue",
                    "description": "Archive a Linear issue",
                    "input": {"parameters": [
                        {"name": "issue", "required": true, "value_schema": {"val_type": "string"}}
                    ]}
                }
            ],
            "total_count": 2
        })))
        .mount(server)
        .await;
}

struct SessionOutput {
    transcript: String,
    errors: String,
}

async fn run_session(
    server: &MockServer,
    provider: ScriptedProvider,
    input: &'static str,
) -> SessionOutput {
    let arcade = Arc::new(ArcadeClient::new(
        server.uri(),
        "arc_test",
        Duration::from_secs(5),
    ));
    let tools = get_tools(
        arcade.as_ref(),
        &ToolQuery {
            toolkits: vec!["Linear".into()],
            tools: Vec::new(),
            user_id: USER.into(),
            limit: 100,
        },
    )
    .await
    .expect("tools load");
    assert_eq!(tools.len(), 2);

    let policy = ApprovalPolicy::new(&ApprovalConfig {
        tools: Vec::new(),
        verbs: vec!["Archive".into()],
        exempt: Vec::new(),
    });
    let agent = ReactAgent::new(
        provider,
        tools,
        arcade.clone(),
        AgentOptions::new("gpt-4o", USER),
    )
    .with_approval_policy(policy);
    let session = SessionLoop::new(agent, InterruptResolver::new(arcade), "1", 16);

    let mut operator = ConsoleOperator::new(input.as_bytes(), Vec::new(), Vec::new());
    session.run(&mut operator).await.expect("session ends cleanly");
    let (transcript, errors) = operator.into_parts();
    SessionOutput {
        transcript: String::from_utf8(transcript).expect("utf-8 output"),
        errors: String::from_utf8(errors).expect("utf-8 output"),
    }
}

#[tokio::test]
async fn declined_archive_never_reaches_the_tool_service() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "Linear_ArchiveIssue", json!({"issue": "TOO-123"})),
        ChatMessage::assistant("Understood, TOO-123 stays as it is.", Vec::new()),
    ]);
    let output = run_session(&server, provider.clone(), "archive TOO-123\nno\nexit\n")
        .await
        .transcript;

    assert!(output.contains("Welcome to the chatbot! Type 'exit' to quit."));
    assert!(output.contains("⚙️: Human in the loop required for tool call Linear_ArchiveIssue"));
    assert!(output.contains(r#"⚙️: Please approve the tool call {"issue":"TOO-123"}"#));
    assert!(output.contains("Do you approve this tool call? (y/n) "));
    assert!(output.contains("Understood, TOO-123 stays as it is."));
    assert!(output.contains("👋 Bye..."));

    let requests = provider.recordings.lock().await;
    assert_eq!(requests.len(), 2);
    let denial = requests[1]
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("denial tool message");
    assert_eq!(denial.tool_call_id.as_deref(), Some("call_1"));
    assert!(denial.content.contains("did not authorize"));
}

#[tokio::test]
async fn authorization_is_awaited_then_the_tool_runs() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ar_1",
            "url": "https://arcade.example/oauth/ar_1",
            "status": "pending"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/status"))
        .and(query_param("id", "ar_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ar_1",
            "status": "completed"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "output": {"value": {"identifier": "TOO-1", "state": "In Progress"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ScriptedProvider::new(vec![
        tool_call("call_1", "Linear_GetIssue", json!({"issue": "TOO-1"})),
        ChatMessage::assistant("TOO-1 is In Progress.", Vec::new()),
    ]);
    let output = run_session(&server, provider.clone(), "show TOO-1\nexit\n")
        .await
        .transcript;

    assert!(output.contains("⚙️: Authorization required for tool call Linear_GetIssue"));
    assert!(output.contains("⚙️: Please authorize in your browser https://arcade.example/oauth/ar_1"));
    assert!(output.contains("⚙️: Authorization granted. Resuming execution..."));
    assert!(output.contains("TOO-1 is In Progress."));
    assert!(!output.contains("Do you approve this tool call?"));

    let requests = provider.recordings.lock().await;
    let result = requests[1]
        .messages
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool result");
    assert!(result.content.contains("In Progress"));
}

#[tokio::test]
async fn failed_turn_is_reported_and_the_next_line_is_read() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    // no scripted replies: the first model call fails
    let provider = ScriptedProvider::new(Vec::new());
    let output = run_session(&server, provider.clone(), "hello\nhello again\nexit\n").await;

    assert_eq!(output.transcript.matches("> ").count(), 3);
    assert!(!output.transcript.contains("could not be processed"));
    assert_eq!(output.errors.matches("could not be processed").count(), 2);
    assert_eq!(provider.recordings.lock().await.len(), 2);
}
