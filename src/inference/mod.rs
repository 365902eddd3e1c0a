//! Inference client for the hosted completion endpoint.
//!
//! This module handles all communication with the completion proxy:
//! - Responses API request/response types
//! - The `CompletionTransport` seam and its reqwest implementation
//! - Configuration loading from `supervisor.yaml`

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::{CompletionTransport, ResponsesClient};
pub use config::{LoggingConfig, SupervisorConfig};
pub use errors::InferenceError;
pub use types::{InputItem, OutputItem, ResponsesReply, ResponsesRequest, Role, ToolCall, ToolDefinition};
