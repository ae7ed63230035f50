mod approval;
mod catalog;
mod error;
mod interface;

pub use approval::ApprovalPolicy;
pub use catalog::{ToolSet, get_tools};
pub use error::ToolServiceError;
pub use interface::{
    AuthorizationResponse, AuthorizationStatus, AuthorizationWaiter, ExecuteToolResponse,
    ToolBackend, ToolCatalog, ToolDefinition, ToolOutput, ToolOutputError, ToolPage, ToolQuery,
};
