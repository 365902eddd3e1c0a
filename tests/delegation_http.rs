//! End-to-end delegation over HTTP against a mock completion endpoint.

use std::sync::{Arc, Mutex};

use chat_supervisor::agent_core::{Breadcrumb, StaticCareData};
use chat_supervisor::commands::{DelegationContext, DelegationInput, DelegationResponse};
use chat_supervisor::inference::SupervisorConfig;
use chat_supervisor::ChatSupervisorScenario;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scenario(server: &MockServer) -> ChatSupervisorScenario {
    let config = SupervisorConfig {
        base_url: server.uri(),
        ..SupervisorConfig::default()
    };
    ChatSupervisorScenario::from_config(&config, Arc::new(StaticCareData::demo())).unwrap()
}

fn input(text: &str) -> DelegationInput {
    DelegationInput {
        relevant_context_from_last_user_message: text.to_string(),
    }
}

#[tokio::test]
async fn patient_lookup_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{
                "type": "function_call",
                "call_id": "call_1",
                "name": "get_patient_details",
                "arguments": "{\"patient_id\":\"1\"}"
            }]
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/responses"))
        .and(body_string_contains("function_call_output"))
        .and(body_string_contains("John Doe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{
                    "type": "output_text",
                    "text": "I see John Doe has referrals for Orthopedics and Primary Care. Which would you like to book first?"
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let crumbs: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = crumbs.clone();
    let breadcrumb: Breadcrumb = Arc::new(move |title: &str, _data: Option<&Value>| {
        sink.lock().unwrap().push(title.to_string());
    });

    let response = scenario(&server)
        .delegation
        .execute(
            input("patient_id is 1"),
            DelegationContext {
                breadcrumb: Some(breadcrumb),
                ..DelegationContext::default()
            },
        )
        .await;

    assert_eq!(
        response,
        DelegationResponse::NextResponse {
            next_response: "I see John Doe has referrals for Orthopedics and Primary Care. \
                            Which would you like to book first?"
                .to_string()
        }
    );
    assert_eq!(crumbs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn server_error_returns_generic_message_after_one_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let response = scenario(&server)
        .delegation
        .execute(input("patient_id is 1"), DelegationContext::default())
        .await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"error": "Something went wrong."})
    );
}
