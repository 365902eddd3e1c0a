//! Supervisor orchestrator: the completion ⇄ tool-execution loop.
//!
//! One run per front-agent delegation:
//! 1. **Send** the accumulated conversation body to the completion endpoint
//! 2. **Inspect** the reply. No function calls means the run is done and the
//!    message text is returned
//! 3. **Execute** every requested tool in order, append the call echo and its
//!    output to the body, and go back to 1
//!
//! Runs are bounded by `max_turns` completion calls and every remote call
//! races the caller's cancellation token.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::inference::client::{CompletionTransport, ResponsesClient};
use crate::inference::config::SupervisorConfig;
use crate::inference::types::{ContentPart, OutputItem, ResponsesReply, ToolCall};

use super::care_data::CareDataProvider;
use super::conversation::ConversationBody;
use super::errors::SupervisorError;
use super::prompts::PromptSet;
use super::tool_router::{ToolExecution, ToolRouter};

// ─── Types ──────────────────────────────────────────────────────────────────

/// Observational callback: `(title, data)`. Never affects control flow.
pub type Breadcrumb = Arc<dyn Fn(&str, Option<&Value>) + Send + Sync>;

/// Inputs for a single supervisor run.
#[derive(Default)]
pub struct SupervisorRequest<'a> {
    /// Front-agent history; only `message` items are forwarded.
    pub history: &'a [Value],
    /// Free-text summary of the most recent user intent.
    pub relevant_context: &'a str,
    pub breadcrumb: Option<Breadcrumb>,
    /// Cancels the in-flight completion call and stops the run.
    pub cancel: Option<CancellationToken>,
}

// ─── Supervisor ─────────────────────────────────────────────────────────────

/// Holds the transport, tool router and prompt for supervisor runs.
///
/// Immutable after construction, so one instance can serve concurrent runs
/// behind an `Arc`.
pub struct Supervisor {
    transport: Arc<dyn CompletionTransport>,
    router: ToolRouter,
    prompts: PromptSet,
    model: String,
    max_turns: u32,
}

impl Supervisor {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        data: Arc<dyn CareDataProvider>,
        prompts: PromptSet,
        model: impl Into<String>,
        max_turns: u32,
    ) -> Self {
        Self {
            transport,
            router: ToolRouter::new(data),
            prompts,
            model: model.into(),
            max_turns: max_turns.max(1),
        }
    }

    /// Wire a supervisor from configuration: HTTP transport plus prompt
    /// overrides.
    pub fn from_config(
        config: &SupervisorConfig,
        data: Arc<dyn CareDataProvider>,
    ) -> Result<Self, SupervisorError> {
        config.validate()?;
        let transport = ResponsesClient::from_config(config)?;
        let prompts = PromptSet::load(&config.prompts)?;
        Ok(Self::new(
            Arc::new(transport),
            data,
            prompts,
            config.model.clone(),
            config.max_turns,
        ))
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Run the loop to completion and return the final message text.
    pub async fn run(&self, request: SupervisorRequest<'_>) -> Result<String, SupervisorError> {
        let run_id = Uuid::new_v4();
        self.run_loop(request)
            .instrument(tracing::info_span!("supervisor_run", %run_id))
            .await
    }

    async fn run_loop(&self, request: SupervisorRequest<'_>) -> Result<String, SupervisorError> {
        let mut body = ConversationBody::new(
            self.model.clone(),
            &self.prompts.supervisor_instructions.text,
            request.history,
            request.relevant_context,
            self.router.catalog().to_vec(),
        );

        tracing::info!(
            model = %self.model,
            history_items = request.history.len(),
            max_turns = self.max_turns,
            "supervisor: starting run"
        );

        for turn in 1..=self.max_turns {
            let reply = self.send(&body, request.cancel.as_ref()).await.map_err(|e| {
                tracing::warn!(
                    turn,
                    category = e.category().as_str(),
                    error = %e,
                    "supervisor: completion failed"
                );
                e
            })?;

            let calls = function_calls(&reply);
            if calls.is_empty() {
                let text = final_text(&reply);
                tracing::info!(turn, chars = text.len(), "supervisor: final response");
                return Ok(text);
            }

            tracing::info!(turn, tool_calls = calls.len(), "supervisor: executing tool calls");
            for call in calls {
                let output = self.execute_call(call, request.breadcrumb.as_ref());
                body.push_tool_exchange(call, output);
            }
        }

        tracing::warn!(max_turns = self.max_turns, "supervisor: turn limit reached");
        Err(SupervisorError::TurnLimitExceeded {
            max_turns: self.max_turns,
        })
    }

    /// Send one completion request, racing the cancellation token.
    async fn send(
        &self,
        body: &ConversationBody,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResponsesReply, SupervisorError> {
        let request = body.to_request();

        let reply = match cancel {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(SupervisorError::Cancelled);
                }
                tokio::select! {
                    _ = token.cancelled() => return Err(SupervisorError::Cancelled),
                    reply = self.transport.create_response(&request) => reply,
                }
            }
            None => self.transport.create_response(&request).await,
        }?;

        // Not every transport maps the marker itself.
        if let Some(message) = reply.error_message() {
            return Err(SupervisorError::Upstream { message });
        }
        Ok(reply)
    }

    /// Decode, dispatch and report a single tool call. Returns the
    /// serialized output for the conversation body.
    fn execute_call(&self, call: &ToolCall, breadcrumb: Option<&Breadcrumb>) -> String {
        let ToolExecution { arguments, outcome } = self.router.dispatch(&call.name, &call.arguments);

        tracing::info!(
            tool = %call.name,
            call_id = %call.call_id,
            success = outcome.is_success(),
            "supervisor: tool executed"
        );

        let result = outcome.to_json();
        if let Some(notify) = breadcrumb {
            let call_title = format!("[supervisorAgent] function call: {}", call.name);
            let result_title = format!("[supervisorAgent] function call result: {}", call.name);
            notify(call_title.as_str(), Some(&arguments));
            notify(result_title.as_str(), Some(&result));
        }

        result.to_string()
    }
}

// ─── Reply inspection ───────────────────────────────────────────────────────

/// Function-call items of a reply, in the order returned.
pub fn function_calls(reply: &ResponsesReply) -> Vec<&ToolCall> {
    reply
        .output
        .iter()
        .filter_map(|item| match item {
            OutputItem::FunctionCall(call) => Some(call),
            _ => None,
        })
        .collect()
}

/// Concatenate `output_text` parts: no separator within a message, one
/// newline between messages.
pub fn final_text(reply: &ResponsesReply) -> String {
    reply
        .output
        .iter()
        .filter_map(|item| match item {
            OutputItem::Message { content } => Some(
                content
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::OutputText { text } => Some(text.as_str()),
                        ContentPart::Other => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Tests ──────────────────────────────────────────────────────────────────
