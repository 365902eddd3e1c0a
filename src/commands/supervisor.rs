//! The delegation tool exposed to the front agent.
//!
//! `getNextResponseFromSupervisor` is the only tool the front agent may
//! call. It forwards the conversation to the [`Supervisor`] and collapses
//! every failure to the generic message, so the front agent never sees
//! internal error detail.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::agent_core::errors::SupervisorError;
use crate::agent_core::orchestrator::{Breadcrumb, Supervisor, SupervisorRequest};
use crate::inference::types::ToolDefinition;

pub const DELEGATION_TOOL_NAME: &str = "getNextResponseFromSupervisor";

// ─── Types ──────────────────────────────────────────────────────────────────

/// Arguments the front agent passes to the delegation tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DelegationInput {
    #[serde(default)]
    pub relevant_context_from_last_user_message: String,
}

/// Ambient context from the realtime session. Every field is optional.
#[derive(Default)]
pub struct DelegationContext {
    /// Raw realtime history items; non-message items are filtered out.
    pub history: Vec<Value>,
    pub breadcrumb: Option<Breadcrumb>,
    pub cancel: Option<CancellationToken>,
}

/// What the front agent receives back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelegationResponse {
    NextResponse {
        #[serde(rename = "nextResponse")]
        next_response: String,
    },
    Error { error: String },
}

impl DelegationResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, DelegationResponse::Error { .. })
    }
}

impl From<Result<String, SupervisorError>> for DelegationResponse {
    fn from(result: Result<String, SupervisorError>) -> Self {
        match result {
            Ok(next_response) => DelegationResponse::NextResponse { next_response },
            Err(e) => DelegationResponse::Error {
                error: e.user_message().to_string(),
            },
        }
    }
}

// ─── DelegationTool ─────────────────────────────────────────────────────────

/// Front-agent tool that hands the turn to the supervisor.
#[derive(Clone)]
pub struct DelegationTool {
    supervisor: Arc<Supervisor>,
}

impl DelegationTool {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    /// Schema advertised to the front agent.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::function(
            DELEGATION_TOOL_NAME,
            "Determines the next response whenever the agent faces a non-trivial decision, \
             produced by a highly intelligent supervisor agent. Returns a message describing \
             what to do next.",
            json!({
                "type": "object",
                "properties": {
                    "relevantContextFromLastUserMessage": {
                        "type": "string",
                        "description": "Key information from the user described in their most \
                            recent message. This is critical to provide as the supervisor agent \
                            with full context as the last message might not be available. Okay \
                            to omit if the user message didn't add any new information."
                    }
                },
                "required": ["relevantContextFromLastUserMessage"],
                "additionalProperties": false
            }),
        )
    }

    /// Run the supervisor for one front-agent turn.
    pub async fn execute(
        &self,
        input: DelegationInput,
        context: DelegationContext,
    ) -> DelegationResponse {
        let result = self
            .supervisor
            .run(SupervisorRequest {
                history: &context.history,
                relevant_context: &input.relevant_context_from_last_user_message,
                breadcrumb: context.breadcrumb,
                cancel: context.cancel,
            })
            .await;

        if let Err(e) = &result {
            tracing::error!(
                category = e.category().as_str(),
                error = %e,
                "delegation failed"
            );
        }
        result.into()
    }

    /// Entry point for raw tool-call arguments from the realtime runtime.
    pub async fn execute_raw(&self, arguments: &str, context: DelegationContext) -> DelegationResponse {
        match serde_json::from_str::<DelegationInput>(arguments) {
            Ok(input) => self.execute(input, context).await,
            Err(e) => {
                let err = SupervisorError::ArgumentDecode {
                    tool: DELEGATION_TOOL_NAME.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "delegation arguments rejected");
                Err::<String, _>(err).into()
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
