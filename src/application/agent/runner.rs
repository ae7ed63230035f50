use super::checkpoint::{Checkpoint, Checkpointer, MemoryCheckpointer, PendingBatch};
use super::errors::AgentError;
use super::models::{AgentNode, AgentOptions, AgentUpdate, TurnInput};
use super::runtime::ToolRuntime;
use crate::application::tooling::{ApprovalPolicy, ToolBackend, ToolSet};
use crate::model::{ModelProvider, ModelRequest};
use crate::types::{ChatMessage, MessageRole, ToolSpec};
use async_stream::try_stream;
use chrono::Utc;
use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type AgentStream<'a> = BoxStream<'a, Result<AgentUpdate, AgentError>>;

/// Something that executes one submission for a thread and reports progress
/// as a stream of updates.
pub trait AgentExecutor: Send + Sync {
    fn stream<'a>(&'a self, input: TurnInput, thread_id: &'a str) -> AgentStream<'a>;
}

/// ReAct loop: the model node answers or requests tools, the tools node gates
/// and runs them, and control returns to the model until it stops calling tools.
pub struct ReactAgent<P: ModelProvider> {
    provider: P,
    runtime: ToolRuntime,
    checkpointer: Arc<dyn Checkpointer>,
    specs: Vec<ToolSpec>,
    options: AgentOptions,
}

impl<P: ModelProvider> ReactAgent<P> {
    pub fn new(
        provider: P,
        tools: ToolSet,
        backend: Arc<dyn ToolBackend>,
        options: AgentOptions,
    ) -> Self {
        let runtime = ToolRuntime::new(tools, backend, ApprovalPolicy::none(), &options.user_id);
        let specs = runtime.specs();
        Self {
            provider,
            runtime,
            checkpointer: Arc::new(MemoryCheckpointer::new()),
            specs,
            options,
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    pub fn with_approval_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.runtime.set_policy(policy);
        self
    }

    async fn call_model(&self, history: &[ChatMessage]) -> Result<ChatMessage, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = self
            .options
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            messages.push(ChatMessage::new(MessageRole::System, prompt));
        }
        messages.extend_from_slice(history);

        debug!(
            model = self.options.model.as_str(),
            messages = messages.len(),
            tools = self.specs.len(),
            "Calling model"
        );
        let response = self
            .provider
            .chat(ModelRequest {
                model: self.options.model.clone(),
                messages,
                tools: self.specs.clone(),
            })
            .await?;
        let mut reply = response.message;
        reply.role = MessageRole::Assistant;
        Ok(reply)
    }

    async fn save(&self, thread_id: &str, checkpoint: &mut Checkpoint) -> Result<(), AgentError> {
        checkpoint.updated_at = Some(Utc::now());
        self.checkpointer.save(thread_id, checkpoint).await?;
        Ok(())
    }

    /// Applies the submission to the thread state and returns the batch to
    /// continue with, if any.
    async fn accept_input(
        &self,
        checkpoint: &mut Checkpoint,
        input: TurnInput,
        thread_id: &str,
    ) -> Result<Option<PendingBatch>, AgentError> {
        match input {
            TurnInput::Message(text) => {
                if let Some(stale) = checkpoint.pending.take() {
                    warn!(
                        thread_id,
                        calls = stale.calls.len(),
                        "Closing unresolved tool calls before new message"
                    );
                    checkpoint.messages.extend(self.runtime.cancel(&stale));
                }
                checkpoint.messages.push(ChatMessage::user(text));
                self.save(thread_id, checkpoint).await?;
                Ok(None)
            }
            TurnInput::Resume(payload) => {
                let mut batch = checkpoint
                    .pending
                    .clone()
                    .ok_or(AgentError::NothingToResume)?;
                self.runtime
                    .apply_decisions(&mut batch, payload.into_decisions())?;
                checkpoint.pending = None;
                Ok(Some(batch))
            }
        }
    }
}

impl<P: ModelProvider> AgentExecutor for ReactAgent<P> {
    fn stream<'a>(&'a self, input: TurnInput, thread_id: &'a str) -> AgentStream<'a> {
        Box::pin(try_stream! {
            let mut checkpoint = self.checkpointer.load(thread_id).await?.unwrap_or_default();
            let mut resumed = self.accept_input(&mut checkpoint, input, thread_id).await?;
            let mut steps = 0usize;

            loop {
                let mut batch = match resumed.take() {
                    Some(batch) => batch,
                    None => {
                        if steps >= self.options.max_steps {
                            warn!(thread_id, limit = self.options.max_steps, "Step limit reached");
                            Err::<(), _>(AgentError::StepLimit { limit: self.options.max_steps })?;
                        }
                        steps += 1;
                        let reply = self.call_model(&checkpoint.messages).await?;
                        let calls = reply.tool_calls.clone();
                        checkpoint.messages.push(reply.clone());
                        self.save(thread_id, &mut checkpoint).await?;
                        yield AgentUpdate::Messages {
                            node: AgentNode::Agent,
                            messages: vec![reply],
                        };
                        if calls.is_empty() {
                            info!(thread_id, steps, "Agent produced final answer");
                            break;
                        }
                        PendingBatch::new(calls)
                    }
                };

                let interrupts = match self.runtime.gate(&mut batch).await {
                    Ok(interrupts) => interrupts,
                    Err(err) => {
                        checkpoint.messages.extend(self.runtime.cancel(&batch));
                        self.save(thread_id, &mut checkpoint).await?;
                        Err::<(), _>(err)?;
                        continue;
                    }
                };
                if !interrupts.is_empty() {
                    info!(thread_id, interrupts = interrupts.len(), "Suspending tool batch");
                    checkpoint.pending = Some(batch);
                    self.save(thread_id, &mut checkpoint).await?;
                    yield AgentUpdate::Interrupts(interrupts);
                    break;
                }

                let results = self.runtime.execute(batch).await;
                checkpoint.messages.extend(results.iter().cloned());
                self.save(thread_id, &mut checkpoint).await?;
                yield AgentUpdate::Messages {
                    node: AgentNode::Tools,
                    messages: results,
                };
            }
        })
    }
}
