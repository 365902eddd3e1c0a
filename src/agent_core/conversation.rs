//! Conversation body for one supervisor run.
//!
//! The body starts with the system prompt and a single user message that
//! embeds the front agent's message history plus the context summary. Within
//! a run the input sequence is append-only and the tool catalog is fixed.

use serde_json::Value;

use crate::inference::types::{InputItem, ResponsesRequest, ToolCall, ToolDefinition};

/// Keep only front-agent history entries whose `type` is `message`.
///
/// Tool calls, handoffs and other realtime item kinds are dropped.
pub fn filter_message_items(history: &[Value]) -> Vec<&Value> {
    history
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .collect()
}

/// Render the user message handed to the supervisor.
pub fn render_context_message(history: &[Value], relevant_context: &str) -> String {
    let filtered = filter_message_items(history);
    let history_json = serde_json::to_string_pretty(&filtered).unwrap_or_else(|_| "[]".to_string());
    format!(
        "==== Conversation History ====\n{history_json}\n\n\
         ==== Relevant Context From Last User Message ===\n{relevant_context}\n"
    )
}

/// Accumulated request state for a single orchestration run.
#[derive(Debug, Clone)]
pub struct ConversationBody {
    model: String,
    input: Vec<InputItem>,
    tools: Vec<ToolDefinition>,
}

impl ConversationBody {
    /// Start a body with the system prompt and the rendered context message.
    pub fn new(
        model: impl Into<String>,
        system_prompt: &str,
        history: &[Value],
        relevant_context: &str,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            model: model.into(),
            input: vec![
                InputItem::system(system_prompt),
                InputItem::user(render_context_message(history, relevant_context)),
            ],
            tools,
        }
    }

    pub fn input(&self) -> &[InputItem] {
        &self.input
    }

    /// Append the echo of a tool call and its serialized result.
    pub fn push_tool_exchange(&mut self, call: &ToolCall, output: String) {
        self.input.push(InputItem::FunctionCall {
            call_id: call.call_id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });
        self.input.push(InputItem::FunctionCallOutput {
            call_id: call.call_id.clone(),
            output,
        });
    }

    /// Snapshot of the body as a wire request. Parallel tool calls are
    /// always disabled.
    pub fn to_request(&self) -> ResponsesRequest {
        ResponsesRequest {
            model: self.model.clone(),
            input: self.input.clone(),
            tools: self.tools.clone(),
            parallel_tool_calls: false,
        }
    }
}
