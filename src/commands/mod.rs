//! Surfaces exposed to the realtime voice runtime.
//!
//! - `front_agent`: static configuration of the nurse-facing agent
//! - `supervisor`: the `getNextResponseFromSupervisor` delegation tool

pub mod front_agent;
pub mod supervisor;

pub use front_agent::{chat_agent, chat_supervisor_scenario, FrontAgentConfig};
pub use supervisor::{DelegationContext, DelegationInput, DelegationResponse, DelegationTool};
