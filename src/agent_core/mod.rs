//! Agent Core — the supervisor side of the chat-supervisor pair.
//!
//! Submodules:
//! - `orchestrator`: completion ⇄ tool-execution loop
//! - `tool_router`: tool catalog and in-process dispatcher
//! - `care_data`: read-only patient and hospital data behind the tools
//! - `conversation`: append-only conversation body for one run
//! - `prompts`: versioned prompt templates
//! - `errors`: supervisor error types

pub mod care_data;
pub mod conversation;
pub mod errors;
pub mod orchestrator;
pub mod prompts;
pub mod tool_router;

// Re-exports for convenience
pub use care_data::{CareDataProvider, PatientRecord, StaticCareData};
pub use conversation::ConversationBody;
pub use errors::{ErrorCategory, SupervisorError, GENERIC_ERROR_MESSAGE};
pub use orchestrator::{Breadcrumb, Supervisor, SupervisorRequest};
pub use prompts::{PromptSet, PromptTemplate};
pub use tool_router::{ToolExecution, ToolOutcome, ToolRouter};
