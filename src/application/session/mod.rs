//! Interactive chat session: reads operator input, drives agent turns and
//! resolves interrupts until each turn completes.

mod driver;
mod errors;
mod resolver;
mod resume;

pub use driver::drive;
pub use errors::SessionError;
pub use resolver::InterruptResolver;
pub use resume::resume_input;

use crate::application::agent::{AgentExecutor, TurnInput};
use crate::application::terminal::Operator;
use tracing::{debug, error, info, warn};

const PROMPT: &str = "> ";
const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSummary {
    pub resume_rounds: usize,
}

pub struct SessionLoop<A> {
    agent: A,
    resolver: InterruptResolver,
    thread_id: String,
    max_resume_rounds: usize,
}

impl<A: AgentExecutor> SessionLoop<A> {
    pub fn new(
        agent: A,
        resolver: InterruptResolver,
        thread_id: impl Into<String>,
        max_resume_rounds: usize,
    ) -> Self {
        Self {
            agent,
            resolver,
            thread_id: thread_id.into(),
            max_resume_rounds,
        }
    }

    /// Runs until the operator types `exit` or input ends. A failed turn is
    /// reported and the loop carries on; terminal failures end the session.
    pub async fn run<O>(&self, operator: &mut O) -> Result<(), SessionError>
    where
        O: Operator + ?Sized,
    {
        info!(thread_id = self.thread_id.as_str(), "Session started");
        operator.welcome().await?;

        loop {
            let Some(line) = operator.read_line(PROMPT).await? else {
                info!("Input closed");
                break;
            };
            let text = line.trim();
            if text.eq_ignore_ascii_case(EXIT_COMMAND) {
                break;
            }
            if text.is_empty() {
                continue;
            }

            match self.drive_turn(TurnInput::Message(line), operator).await {
                Ok(summary) => {
                    debug!(resume_rounds = summary.resume_rounds, "Turn completed");
                }
                Err(SessionError::Terminal(err)) => return Err(SessionError::Terminal(err)),
                Err(err) => {
                    error!(error = %err, "Turn failed");
                    operator.error(&err.user_message()).await?;
                }
            }
        }

        operator.goodbye().await?;
        info!(thread_id = self.thread_id.as_str(), "Session ended");
        Ok(())
    }

    /// Drives one input through every resume round until the agent stops
    /// raising interrupts.
    pub async fn drive_turn<O>(
        &self,
        input: TurnInput,
        operator: &mut O,
    ) -> Result<TurnSummary, SessionError>
    where
        O: Operator + ?Sized,
    {
        let mut input = input;
        let mut rounds = 0;
        loop {
            let interrupts = drive(&self.agent, input, &self.thread_id, operator).await?;
            if interrupts.is_empty() {
                return Ok(TurnSummary {
                    resume_rounds: rounds,
                });
            }
            if rounds >= self.max_resume_rounds {
                warn!(rounds, pending = interrupts.len(), "Interrupts keep coming; giving up");
                return Err(SessionError::NotConverged { rounds });
            }

            let decisions = self.resolver.resolve_all(&interrupts, operator).await?;
            debug!(round = rounds + 1, decisions = decisions.len(), "Resuming turn");
            input = resume_input(decisions)?;
            rounds += 1;
        }
    }
}
