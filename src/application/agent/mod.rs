mod checkpoint;
mod errors;
mod models;
mod runner;
mod runtime;


pub use checkpoint::{
    Checkpoint, CheckpointError, Checkpointer, Gate, MemoryCheckpointer, PendingBatch, PendingCall,
};
pub use errors::AgentError;
pub use models::{
    AgentNode, AgentOptions, AgentUpdate, Decision, Interrupt, InterruptKind, InterruptValue,
    ResumePayload, TurnInput,
};
pub use runner::{AgentExecutor, AgentStream, ReactAgent};
