//! Front agent configuration for the realtime voice runtime.
//!
//! The front agent has no logic of its own: it greets the nurse and hands
//! every non-trivial turn to the supervisor through the delegation tool.

use serde::Serialize;

use crate::agent_core::prompts::PromptSet;
use crate::inference::types::ToolDefinition;

use super::supervisor::DelegationTool;

/// Company the agents represent. Used by output guardrails.
pub const CHAT_SUPERVISOR_COMPANY_NAME: &str = "Kouper Health";

pub const CHAT_AGENT_NAME: &str = "chatAgent";
pub const CHAT_AGENT_VOICE: &str = "sage";

/// Static description of a realtime agent.
#[derive(Debug, Clone, Serialize)]
pub struct FrontAgentConfig {
    pub name: String,
    pub voice: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

impl FrontAgentConfig {
    /// Tool names this agent may call.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// The nurse-facing agent. Its only tool is the delegation tool.
pub fn chat_agent(prompts: &PromptSet) -> FrontAgentConfig {
    FrontAgentConfig {
        name: CHAT_AGENT_NAME.to_string(),
        voice: CHAT_AGENT_VOICE.to_string(),
        instructions: prompts.front_agent_instructions.text.clone(),
        tools: vec![DelegationTool::definition()],
    }
}

/// Agents in this scenario, in handoff order.
pub fn chat_supervisor_scenario(prompts: &PromptSet) -> Vec<FrontAgentConfig> {
    vec![chat_agent(prompts)]
}
