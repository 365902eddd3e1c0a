//! Wire types for the completion endpoint.
//!
//! These mirror the Responses API shapes: a request carries an ordered list
//! of input items plus a flat tool catalog; a reply carries either an
//! `output` list of tagged items or an `error` marker.

use serde::{Deserialize, Serialize};

// ─── Request Types ───────────────────────────────────────────────────────────

/// Message role for `message` input items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single entry in the conversation body's `input` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    /// A system or user message with plain text content.
    Message { role: Role, content: String },
    /// Echo of a function call the model requested.
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// The serialized result of a function call.
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub fn system(content: impl Into<String>) -> Self {
        InputItem::Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        InputItem::Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Tool definition sent in the request (flat Responses API shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Build a `function` tool definition.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Request body for `POST {base_url}{responses_path}`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<InputItem>,
    pub tools: Vec<ToolDefinition>,
    pub parallel_tool_calls: bool,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// Decoded reply from the completion endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesReply {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Set to a truthy value when the endpoint reports a failure.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ResponsesReply {
    /// Human-readable form of the `error` marker, if any.
    ///
    /// `null`, `false`, `0` and `""` are not failures.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => None,
            Some(serde_json::Value::Number(n)) if n.as_f64() == Some(0.0) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(
                other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            ),
        }
    }
}

/// One item of a reply's `output` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall(ToolCall),
    /// Reasoning summaries and other item kinds the loop does not act on.
    #[serde(other)]
    Other,
}

/// A content fragment inside an output message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    /// Raw JSON argument payload, decoded by the tool router.
    #[serde(default)]
    pub arguments: String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_items_serialize_with_type_tag() {
        let items = vec![
            InputItem::system("be helpful"),
            InputItem::FunctionCall {
                call_id: "call_1".into(),
                name: "get_patient_details".into(),
                arguments: r#"{"patient_id":"1"}"#.into(),
            },
            InputItem::FunctionCallOutput {
                call_id: "call_1".into(),
                output: "{}".into(),
            },
        ];
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["type"], "message");
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["type"], "function_call");
        assert_eq!(json[1]["call_id"], "call_1");
        assert_eq!(json[2]["type"], "function_call_output");
    }

    #[test]
    fn test_request_carries_parallel_flag() {
        let req = ResponsesRequest {
            model: "gpt-4.1".into(),
            input: vec![],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"parallel_tool_calls\":false"));
    }

    #[test]
    fn test_reply_decodes_mixed_output() {
        let raw = r#"{
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "function_call", "call_id": "c1", "name": "get_hospital_information", "arguments": "{\"topic\":\"x\"}"},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "hi", "annotations": []},
                    {"type": "refusal", "refusal": "no"}
                ]}
            ]
        }"#;
        let reply: ResponsesReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.output.len(), 3);
        assert_eq!(reply.output[0], OutputItem::Other);
        assert!(matches!(&reply.output[1], OutputItem::FunctionCall(tc) if tc.call_id == "c1"));
        match &reply.output[2] {
            OutputItem::Message { content } => {
                assert_eq!(content[0], ContentPart::OutputText { text: "hi".into() });
                assert_eq!(content[1], ContentPart::Other);
            }
            other => panic!("expected message, got {other:?}"),
        }
        assert!(reply.error_message().is_none());
    }

    #[test]
    fn test_reply_error_marker() {
        let reply: ResponsesReply =
            serde_json::from_str(r#"{"error": {"message": "bad key"}}"#).unwrap();
        assert_eq!(reply.error_message().as_deref(), Some("bad key"));

        let reply: ResponsesReply = serde_json::from_str(r#"{"error": null, "output": []}"#).unwrap();
        assert!(reply.error_message().is_none());

        let reply: ResponsesReply = serde_json::from_str(r#"{"error": true}"#).unwrap();
        assert_eq!(reply.error_message().as_deref(), Some("true"));
    }

    #[test]
    fn test_falsy_error_marker_is_ignored() {
        for marker in [r#""""#, "false", "0"] {
            let raw = format!(r#"{{"error": {marker}, "output": []}}"#);
            let reply: ResponsesReply = serde_json::from_str(&raw).unwrap();
            assert!(reply.error_message().is_none(), "marker {marker} treated as failure");
        }
    }
}
