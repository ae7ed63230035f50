use super::errors::SessionError;
use crate::application::agent::{AgentExecutor, AgentUpdate, Interrupt, TurnInput};
use crate::application::terminal::Operator;
use futures::StreamExt;
use tracing::debug;

/// Submits one input and streams the agent's progress to the operator as it
/// arrives. Returns every interrupt the submission raised, in emission order.
pub async fn drive<A, O>(
    agent: &A,
    input: TurnInput,
    thread_id: &str,
    operator: &mut O,
) -> Result<Vec<Interrupt>, SessionError>
where
    A: AgentExecutor + ?Sized,
    O: Operator + ?Sized,
{
    let mut updates = agent.stream(input, thread_id);
    let mut interrupts = Vec::new();

    while let Some(update) = updates.next().await {
        match update? {
            AgentUpdate::Messages { node, messages } => {
                debug!(node = node.as_str(), count = messages.len(), "Agent update");
                for message in &messages {
                    operator.transcript(message).await?;
                }
            }
            AgentUpdate::Interrupts(batch) => {
                debug!(count = batch.len(), "Agent raised interrupts");
                interrupts.extend(batch);
            }
        }
    }

    Ok(interrupts)
}
