use crate::application::tooling::AuthorizationResponse;
use crate::config::defaults::DEFAULT_MAX_STEPS;
use crate::types::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The operator's answer to one interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub fn new(authorized: bool) -> Self {
        Self { authorized }
    }
}

/// Decisions handed back to a suspended turn. A single decision travels as a
/// bare object, several as an ordered array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    Single(Decision),
    Batch(Vec<Decision>),
}

impl ResumePayload {
    pub fn into_decisions(self) -> Vec<Decision> {
        match self {
            ResumePayload::Single(decision) => vec![decision],
            ResumePayload::Batch(decisions) => decisions,
        }
    }
}

/// What a single submission to the agent carries.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    Message(String),
    Resume(ResumePayload),
}

/// Suspension raised while the tools node gates a batch of calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    pub id: String,
    pub value: InterruptValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterruptValue {
    #[serde(default)]
    pub authorization_required: bool,
    #[serde(default)]
    pub hitl_required: bool,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_response: Option<AuthorizationResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

/// How an interrupt must be resolved. Authorization takes priority when a
/// malformed interrupt sets both flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    Authorization,
    Approval,
    Unrecognized,
}

impl Interrupt {
    pub fn new(value: InterruptValue) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            value,
        }
    }

    pub fn authorization(tool_name: impl Into<String>, response: AuthorizationResponse) -> Self {
        Self::new(InterruptValue {
            authorization_required: true,
            tool_name: tool_name.into(),
            authorization_response: Some(response),
            ..InterruptValue::default()
        })
    }

    pub fn approval(tool_name: impl Into<String>, input: Value) -> Self {
        Self::new(InterruptValue {
            hitl_required: true,
            tool_name: tool_name.into(),
            input: Some(input),
            ..InterruptValue::default()
        })
    }

    pub fn kind(&self) -> InterruptKind {
        if self.value.authorization_required {
            InterruptKind::Authorization
        } else if self.value.hitl_required {
            InterruptKind::Approval
        } else {
            InterruptKind::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentNode {
    Agent,
    Tools,
}

impl AgentNode {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentNode::Agent => "agent",
            AgentNode::Tools => "tools",
        }
    }
}

/// One event of the incremental update stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentUpdate {
    Messages {
        node: AgentNode,
        messages: Vec<ChatMessage>,
    },
    Interrupts(Vec<Interrupt>),
}

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub user_id: String,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
}

impl AgentOptions {
    pub fn new(model: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            user_id: user_id.into(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
