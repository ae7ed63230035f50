use super::errors::SessionError;
use crate::application::agent::{Decision, Interrupt, InterruptKind};
use crate::application::terminal::Operator;
use crate::application::tooling::AuthorizationWaiter;
use std::sync::Arc;
use tracing::{info, warn};

const APPROVAL_QUESTION: &str = "Do you approve this tool call?";

/// Turns each interrupt into exactly one decision, either by waiting for an
/// out-of-band authorization or by asking the operator.
#[derive(Clone)]
pub struct InterruptResolver {
    waiter: Arc<dyn AuthorizationWaiter>,
}

impl InterruptResolver {
    pub fn new(waiter: Arc<dyn AuthorizationWaiter>) -> Self {
        Self { waiter }
    }

    /// Resolves interrupts sequentially, keeping their order.
    pub async fn resolve_all<O>(
        &self,
        interrupts: &[Interrupt],
        operator: &mut O,
    ) -> Result<Vec<Decision>, SessionError>
    where
        O: Operator + ?Sized,
    {
        let mut decisions = Vec::with_capacity(interrupts.len());
        for interrupt in interrupts {
            decisions.push(self.resolve(interrupt, operator).await?);
        }
        Ok(decisions)
    }

    pub async fn resolve<O>(
        &self,
        interrupt: &Interrupt,
        operator: &mut O,
    ) -> Result<Decision, SessionError>
    where
        O: Operator + ?Sized,
    {
        match interrupt.kind() {
            InterruptKind::Authorization => self.await_authorization(interrupt, operator).await,
            InterruptKind::Approval => {
                let value = &interrupt.value;
                operator
                    .notice(&format!(
                        "Human in the loop required for tool call {}",
                        value.tool_name
                    ))
                    .await?;
                let input = value
                    .input
                    .as_ref()
                    .map(|input| input.to_string())
                    .unwrap_or_else(|| "{}".to_string());
                operator
                    .notice(&format!("Please approve the tool call {input}"))
                    .await?;
                let approved = operator.confirm(APPROVAL_QUESTION).await?;
                info!(tool = %value.tool_name, approved, "Operator answered approval");
                Ok(Decision::new(approved))
            }
            InterruptKind::Unrecognized => {
                warn!(interrupt = %interrupt.id, "Unrecognized interrupt; denying");
                Ok(Decision::new(false))
            }
        }
    }

    async fn await_authorization<O>(
        &self,
        interrupt: &Interrupt,
        operator: &mut O,
    ) -> Result<Decision, SessionError>
    where
        O: Operator + ?Sized,
    {
        let value = &interrupt.value;
        let response = value.authorization_response.as_ref();
        operator
            .notice(&format!(
                "Authorization required for tool call {}",
                value.tool_name
            ))
            .await?;
        let url = response.and_then(|r| r.url.as_deref()).unwrap_or("(no link provided)");
        operator
            .notice(&format!("Please authorize in your browser {url}"))
            .await?;

        let Some(id) = response.and_then(|r| r.id.as_deref()) else {
            warn!(tool = %value.tool_name, "Authorization interrupt without a handle");
            operator
                .notice("Error waiting for authorization to complete: missing authorization id")
                .await?;
            return Ok(Decision::new(false));
        };

        operator
            .notice("Waiting for you to complete authorization...")
            .await?;
        match self.waiter.wait_for_completion(id).await {
            Ok(_) => {
                info!(tool = %value.tool_name, authorization_id = id, "Authorization granted");
                operator
                    .notice("Authorization granted. Resuming execution...")
                    .await?;
                Ok(Decision::new(true))
            }
            Err(err) => {
                warn!(
                    tool = %value.tool_name,
                    authorization_id = id,
                    error = %err,
                    "Authorization did not complete"
                );
                operator
                    .notice(&format!(
                        "Error waiting for authorization to complete: {}",
                        err.user_message()
                    ))
                    .await?;
                Ok(Decision::new(false))
            }
        }
    }
}
