use super::checkpoint::{Gate, PendingBatch};
use super::errors::AgentError;
use super::models::{Decision, Interrupt};
use crate::application::tooling::{ApprovalPolicy, AuthorizationStatus, ToolBackend, ToolSet};
use crate::types::{ChatMessage, ToolSpec};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Gates, resumes and executes the tool calls of one model reply.
pub struct ToolRuntime {
    tools: ToolSet,
    backend: Arc<dyn ToolBackend>,
    policy: ApprovalPolicy,
    user_id: String,
}

impl ToolRuntime {
    pub fn new(
        tools: ToolSet,
        backend: Arc<dyn ToolBackend>,
        policy: ApprovalPolicy,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            tools,
            backend,
            policy,
            user_id: user_id.into(),
        }
    }

    pub fn set_policy(&mut self, policy: ApprovalPolicy) {
        self.policy = policy;
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.specs()
    }

    /// Checks every call that is not yet cleared and returns the interrupts
    /// raised, in call order. Calls that raise one are marked as awaiting.
    pub async fn gate(&self, batch: &mut PendingBatch) -> Result<Vec<Interrupt>, AgentError> {
        let mut interrupts = Vec::new();
        for pending in batch.calls.iter_mut() {
            pending.awaiting = None;
            if pending.denied {
                continue;
            }
            let Some(tool) = self.tools.get(&pending.call.name) else {
                continue;
            };

            if tool.requires_authorization() && !pending.authorized {
                let response = self
                    .backend
                    .authorize(&tool.qualified_name, &self.user_id)
                    .await?;
                if response.status == AuthorizationStatus::Completed {
                    debug!(tool = %pending.call.name, "Tool already authorized");
                    pending.authorized = true;
                } else {
                    info!(tool = %pending.call.name, "Tool requires authorization");
                    pending.awaiting = Some(Gate::Authorization);
                    interrupts.push(Interrupt::authorization(&pending.call.name, response));
                    continue;
                }
            }

            if !pending.approved && self.policy.requires_approval(tool) {
                info!(tool = %pending.call.name, "Tool requires operator approval");
                pending.awaiting = Some(Gate::Approval);
                interrupts.push(Interrupt::approval(
                    &pending.call.name,
                    pending.call.arguments.clone(),
                ));
            }
        }
        Ok(interrupts)
    }

    /// Applies decisions positionally to the calls awaiting a gate.
    pub fn apply_decisions(
        &self,
        batch: &mut PendingBatch,
        decisions: Vec<Decision>,
    ) -> Result<(), AgentError> {
        let expected = batch.awaiting();
        if expected != decisions.len() {
            return Err(AgentError::ResumeMismatch {
                expected,
                received: decisions.len(),
            });
        }

        let awaiting = batch.calls.iter_mut().filter(|c| c.awaiting.is_some());
        for (pending, decision) in awaiting.zip(decisions) {
            match (pending.awaiting.take(), decision.authorized) {
                (Some(Gate::Authorization), true) => pending.authorized = true,
                (Some(Gate::Approval), true) => pending.approved = true,
                _ => {
                    info!(tool = %pending.call.name, "Tool call denied");
                    pending.denied = true;
                }
            }
        }
        Ok(())
    }

    /// Runs every call of a fully gated batch in order. Failures become tool
    /// messages for the model rather than errors.
    pub async fn execute(&self, batch: PendingBatch) -> Vec<ChatMessage> {
        let mut results = Vec::with_capacity(batch.calls.len());
        for pending in batch.calls {
            let call = pending.call;
            if pending.denied {
                results.push(ChatMessage::tool_result(
                    &call,
                    format!("The user did not authorize the {} tool call.", call.name),
                ));
                continue;
            }
            let Some(tool) = self.tools.get(&call.name) else {
                warn!(tool = %call.name, "Model requested an unknown tool");
                let known: Vec<String> = self.tools.iter().map(|t| t.function_name()).collect();
                results.push(ChatMessage::tool_result(
                    &call,
                    format!(
                        "Error: {} is not a valid tool, try one of [{}].",
                        call.name,
                        known.join(", ")
                    ),
                ));
                continue;
            };

            let content = match self
                .backend
                .execute(&tool.qualified_name, call.arguments.clone(), &self.user_id)
                .await
            {
                Ok(response) => {
                    debug!(tool = %call.name, success = ?response.success, "Tool executed");
                    response.render()
                }
                Err(err) => {
                    warn!(tool = %call.name, error = %err, "Tool execution failed");
                    format!("Error: {err}")
                }
            };
            results.push(ChatMessage::tool_result(&call, content));
        }
        results
    }

    /// Closes a batch that will never be resumed.
    pub fn cancel(&self, batch: &PendingBatch) -> Vec<ChatMessage> {
        batch
            .calls
            .iter()
            .map(|pending| {
                ChatMessage::tool_result(
                    &pending.call,
                    format!(
                        "The {} tool call was cancelled before it ran.",
                        pending.call.name
                    ),
                )
            })
            .collect()
    }
}
