use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::error::ToolServiceError;
use crate::types::ToolSpec;

/// A tool definition as published by the tool service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub qualified_name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub toolkit: Option<ToolkitInfo>,
    #[serde(default)]
    pub input: ToolInputSchema,
    #[serde(default)]
    pub requirements: Option<ToolRequirements>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub value_schema: ValueSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSchema {
    pub val_type: String,
    #[serde(default)]
    pub inner_val_type: Option<String>,
    #[serde(default, rename = "enum")]
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequirements {
    #[serde(default)]
    pub authorization: Option<Value>,
}

impl ToolDefinition {
    /// Function name exposed to the model, e.g. `Linear_CreateIssue`.
    pub fn function_name(&self) -> String {
        self.qualified_name.replace('.', "_")
    }

    pub fn requires_authorization(&self) -> bool {
        self.requirements
            .as_ref()
            .and_then(|req| req.authorization.as_ref())
            .is_some_and(|auth| !auth.is_null())
    }

    pub fn to_spec(&self) -> ToolSpec {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.input.parameters {
            let mut schema = json_type(&param.value_schema);
            if let (Some(description), Value::Object(map)) = (&param.description, &mut schema) {
                map.insert("description".into(), Value::String(description.clone()));
            }
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
            properties.insert(param.name.clone(), schema);
        }
        ToolSpec {
            name: self.function_name(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

fn json_type(schema: &ValueSchema) -> Value {
    let mut value = match schema.val_type.as_str() {
        "array" => {
            let inner = schema.inner_val_type.as_deref().unwrap_or("string");
            json!({ "type": "array", "items": { "type": scalar_type(inner) } })
        }
        other => json!({ "type": scalar_type(other) }),
    };
    if let (Some(allowed), Value::Object(map)) = (&schema.allowed, &mut value) {
        map.insert("enum".into(), json!(allowed));
    }
    value
}

fn scalar_type(val_type: &str) -> &'static str {
    match val_type {
        "integer" => "integer",
        "number" => "number",
        "boolean" => "boolean",
        "json" => "object",
        "array" => "array",
        _ => "string",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotStarted,
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Handle for an out-of-band authorization grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub status: AuthorizationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteToolResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub output: Option<ToolOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<ToolOutputError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutputError {
    pub message: String,
}

impl ExecuteToolResponse {
    /// Text handed back to the model as the tool result.
    pub fn render(&self) -> String {
        let output = self.output.clone().unwrap_or_default();
        if let Some(error) = output.error {
            return format!("Error: {}", error.message);
        }
        if self.success == Some(false) {
            return "Error: the tool call did not succeed".to_string();
        }
        match output.value {
            Some(Value::String(text)) => text,
            Some(value) => value.to_string(),
            None => String::new(),
        }
    }
}

/// Parameters for retrieving tool definitions.
#[derive(Debug, Clone)]
pub struct ToolQuery {
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub user_id: String,
    pub limit: usize,
}

#[async_trait]
pub trait ToolCatalog: Send + Sync {
    async fn list_tools(
        &self,
        toolkit: &str,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ToolPage, ToolServiceError>;

    async fn get_tool(&self, name: &str, user_id: &str) -> Result<ToolDefinition, ToolServiceError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolPage {
    #[serde(default)]
    pub items: Vec<ToolDefinition>,
    #[serde(default)]
    pub total_count: Option<usize>,
}

#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn authorize(
        &self,
        tool: &str,
        user_id: &str,
    ) -> Result<AuthorizationResponse, ToolServiceError>;

    async fn execute(
        &self,
        tool: &str,
        input: Value,
        user_id: &str,
    ) -> Result<ExecuteToolResponse, ToolServiceError>;
}

/// Blocks until an out-of-band authorization completes or fails.
#[async_trait]
pub trait AuthorizationWaiter: Send + Sync {
    async fn wait_for_completion(
        &self,
        authorization_id: &str,
    ) -> Result<AuthorizationResponse, ToolServiceError>;
}
