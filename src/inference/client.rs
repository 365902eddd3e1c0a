//! Completion endpoint client.
//!
//! Sends the accumulated conversation body to the completion proxy and
//! decodes the reply. The orchestrator only sees the [`CompletionTransport`]
//! trait, so tests can substitute a scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::config::SupervisorConfig;
use super::errors::InferenceError;
use super::types::{ResponsesReply, ResponsesRequest};

// ─── Transport seam ──────────────────────────────────────────────────────────

/// Anything that can turn a conversation body into a model reply.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send one completion request.
    ///
    /// Implementations must map an `error` marker in the decoded reply to
    /// [`InferenceError::UpstreamError`], so callers only ever receive
    /// replies that are safe to inspect.
    async fn create_response(
        &self,
        body: &ResponsesRequest,
    ) -> Result<ResponsesReply, InferenceError>;
}

// ─── ResponsesClient ─────────────────────────────────────────────────────────

/// HTTP client for the completion proxy.
pub struct ResponsesClient {
    http: HttpClient,
    /// Fully-qualified endpoint URL.
    url: String,
    /// Request timeout, kept for error reporting.
    timeout: Duration,
}

impl ResponsesClient {
    /// Build a client from configuration.
    ///
    /// Does NOT check connectivity. That happens on the first request.
    pub fn from_config(config: &SupervisorConfig) -> Result<Self, InferenceError> {
        let url = config.responses_url();
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, url, timeout })
    }
}

#[async_trait]
impl CompletionTransport for ResponsesClient {
    async fn create_response(
        &self,
        body: &ResponsesRequest,
    ) -> Result<ResponsesReply, InferenceError> {
        // Log the request metadata (not the full body, it carries patient data)
        tracing::info!(
            url = %self.url,
            model = %body.model,
            input_items = body.input.len(),
            tool_count = body.tools.len(),
            "completion request"
        );

        let response = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        duration_secs: self.timeout.as_secs(),
                    }
                } else {
                    InferenceError::ConnectionFailed {
                        endpoint: self.url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "completion endpoint returned an error status");
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout {
                    duration_secs: self.timeout.as_secs(),
                }
            } else {
                InferenceError::InvalidResponse {
                    reason: format!("failed to read response body: {e}"),
                }
            }
        })?;

        parse_reply(&body_text)
    }
}

/// Decode a reply body, surfacing the `error` marker as an error.
pub fn parse_reply(body_text: &str) -> Result<ResponsesReply, InferenceError> {
    let reply: ResponsesReply =
        serde_json::from_str(body_text).map_err(|e| InferenceError::InvalidResponse {
            reason: format!("failed to decode reply: {e}"),
        })?;

    if let Some(message) = reply.error_message() {
        return Err(InferenceError::UpstreamError { message });
    }

    Ok(reply)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_core::errors::{ErrorCategory, SupervisorError};
    use crate::inference::types::{InputItem, OutputItem};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SupervisorConfig {
        SupervisorConfig {
            base_url: server.uri(),
            ..SupervisorConfig::default()
        }
    }

    fn request() -> ResponsesRequest {
        ResponsesRequest {
            model: "gpt-4.1".into(),
            input: vec![InputItem::user("patient_id is 1")],
            tools: vec![],
            parallel_tool_calls: false,
        }
    }

    #[test]
    fn test_parse_reply_ok() {
        let reply = parse_reply(r#"{"output": [{"type": "message", "content": []}]}"#).unwrap();
        assert_eq!(reply.output.len(), 1);
    }

    #[test]
    fn test_parse_reply_error_marker() {
        let err = parse_reply(r#"{"error": "quota exceeded"}"#).unwrap_err();
        assert!(matches!(err, InferenceError::UpstreamError { message } if message == "quota exceeded"));
    }

    #[test]
    fn test_parse_reply_falsy_marker_keeps_output() {
        let reply = parse_reply(
            r#"{"error": "", "output": [{"type": "message", "content": [{"type": "output_text", "text": "ok"}]}]}"#,
        )
        .unwrap();
        assert_eq!(reply.output.len(), 1);

        let reply = parse_reply(r#"{"error": false, "output": []}"#).unwrap();
        assert!(reply.output.is_empty());
    }

    #[test]
    fn test_parse_reply_garbage() {
        let err = parse_reply("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_posts_body_and_decodes_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/responses"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1",
                "parallel_tool_calls": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "output": [{
                    "type": "function_call",
                    "call_id": "call_1",
                    "name": "get_patient_details",
                    "arguments": "{\"patient_id\":\"1\"}"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResponsesClient::from_config(&config_for(&server)).unwrap();
        let reply = client.create_response(&request()).await.unwrap();
        assert!(matches!(&reply.output[0], OutputItem::FunctionCall(tc) if tc.name == "get_patient_details"));
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/responses"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = ResponsesClient::from_config(&config_for(&server)).unwrap();
        let err = client.create_response(&request()).await.unwrap_err();
        match err {
            InferenceError::HttpError { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected HttpError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"output": []}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = SupervisorConfig {
            request_timeout_secs: 1,
            ..config_for(&server)
        };
        let client = ResponsesClient::from_config(&config).unwrap();
        let err = client.create_response(&request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Timeout { duration_secs: 1 }), "got {err:?}");

        let err = SupervisorError::from(err);
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let config = SupervisorConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..SupervisorConfig::default()
        };
        let client = ResponsesClient::from_config(&config).unwrap();
        let err = client.create_response(&request()).await.unwrap_err();
        assert!(err.is_transport_failure(), "got {err:?}");
    }
}
