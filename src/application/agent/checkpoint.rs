use crate::types::{ChatMessage, ToolCall};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint store unavailable: {0}")]
    Unavailable(String),
}

/// Which gate a pending call is currently stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Authorization,
    Approval,
}

/// A tool call waiting for its gates to clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCall {
    pub call: ToolCall,
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub denied: bool,
    #[serde(default)]
    pub awaiting: Option<Gate>,
}

impl PendingCall {
    pub fn new(call: ToolCall) -> Self {
        Self {
            call,
            authorized: false,
            approved: false,
            denied: false,
            awaiting: None,
        }
    }
}

/// The tool calls of one model reply, suspended until every interrupt they
/// raised has a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingBatch {
    pub calls: Vec<PendingCall>,
}

impl PendingBatch {
    pub fn new(calls: Vec<ToolCall>) -> Self {
        Self {
            calls: calls.into_iter().map(PendingCall::new).collect(),
        }
    }

    pub fn awaiting(&self) -> usize {
        self.calls.iter().filter(|c| c.awaiting.is_some()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub pending: Option<PendingBatch>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError>;
    async fn save(&self, thread_id: &str, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;
}

/// Process-local checkpoint store; state lives until the process exits.
#[derive(Default)]
pub struct MemoryCheckpointer {
    threads: Mutex<HashMap<String, Checkpoint>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self.threads.lock().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        debug!(
            thread_id,
            messages = checkpoint.messages.len(),
            pending = checkpoint.pending.is_some(),
            "Saving checkpoint"
        );
        self.threads
            .lock()
            .await
            .insert(thread_id.to_string(), checkpoint.clone());
        Ok(())
    }
}
