//! ToolRouter — dispatches supervisor tool calls to the care data layer.
//!
//! The router owns the immutable tool catalog sent with every completion
//! request and executes calls synchronously, in-process. Every call yields a
//! [`ToolOutcome`]; nothing here aborts the conversation. Failures are fed
//! back to the model as tool output so it can react conversationally.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::inference::types::ToolDefinition;

use super::care_data::CareDataProvider;
use super::errors::SupervisorError;

// ─── Tool names ─────────────────────────────────────────────────────────────

pub const GET_PATIENT_DETAILS: &str = "get_patient_details";
pub const GET_HOSPITAL_INFORMATION: &str = "get_hospital_information";
pub const BOOK_APPOINTMENT: &str = "book_appointment";

/// Failure text returned for unknown patient ids.
const PATIENT_NOT_FOUND: &str = "Patient not found.";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PatientDetailsArgs {
    patient_id: String,
}

#[derive(Debug, Deserialize)]
struct HospitalInfoArgs {
    /// Accepted for the model's benefit, never used for filtering.
    #[serde(default)]
    #[allow(dead_code)]
    topic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookAppointmentArgs {
    patient_name: String,
    provider_name: String,
    /// `NEW` or `ESTABLISHED`; the schema constrains it, the router does not.
    appointment_type: String,
    location: String,
    date_time: String,
}

// ─── Outcome ────────────────────────────────────────────────────────────────

/// Result of a single tool execution, ready to serialize as tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// `{"success": true, ...payload}`.
    Success(serde_json::Map<String, Value>),
    /// `{"success": false, "error": ...}`.
    Failure { error: String },
    /// `{"result": "Unknown function: <name>"}`.
    UnknownFunction { name: String },
}

impl ToolOutcome {
    fn success(key: &str, value: Value) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert(key.to_string(), value);
        ToolOutcome::Success(payload)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// JSON form fed back to the model and to breadcrumbs.
    pub fn to_json(&self) -> Value {
        match self {
            ToolOutcome::Success(payload) => {
                let mut obj = serde_json::Map::with_capacity(payload.len() + 1);
                obj.insert("success".to_string(), Value::Bool(true));
                obj.extend(payload.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(obj)
            }
            ToolOutcome::Failure { error } => json!({ "success": false, "error": error }),
            ToolOutcome::UnknownFunction { name } => {
                json!({ "result": format!("Unknown function: {name}") })
            }
        }
    }
}

/// A dispatched call: the arguments as decoded (or the raw payload when
/// decoding failed) and the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

impl From<SupervisorError> for ToolOutcome {
    fn from(e: SupervisorError) -> Self {
        match e {
            SupervisorError::PatientNotFound { .. } => ToolOutcome::Failure {
                error: PATIENT_NOT_FOUND.to_string(),
            },
            SupervisorError::UnknownTool { name } => ToolOutcome::UnknownFunction { name },
            other => ToolOutcome::Failure {
                error: capitalize_first(&other.to_string()),
            },
        }
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─── ToolRouter ─────────────────────────────────────────────────────────────

/// Executes supervisor tools against a [`CareDataProvider`].
pub struct ToolRouter {
    data: Arc<dyn CareDataProvider>,
    catalog: Vec<ToolDefinition>,
}

impl ToolRouter {
    pub fn new(data: Arc<dyn CareDataProvider>) -> Self {
        Self {
            data,
            catalog: supervisor_tool_definitions(),
        }
    }

    /// The tool catalog sent with every completion request.
    pub fn catalog(&self) -> &[ToolDefinition] {
        &self.catalog
    }

    /// Decode raw arguments and execute the named tool.
    ///
    /// An empty argument string is treated as `{}`. Malformed JSON is
    /// reported as a failure outcome, never as empty arguments, and the raw
    /// payload is kept as the call's arguments.
    pub fn dispatch(&self, name: &str, raw_arguments: &str) -> ToolExecution {
        match decode_arguments(name, raw_arguments) {
            Ok(arguments) => {
                let outcome = self.execute(name, &arguments);
                ToolExecution { arguments, outcome }
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call arguments rejected");
                ToolExecution {
                    arguments: Value::String(raw_arguments.to_string()),
                    outcome: e.into(),
                }
            }
        }
    }

    fn execute(&self, name: &str, args: &Value) -> ToolOutcome {
        let result = match name {
            GET_PATIENT_DETAILS => self.get_patient_details(args),
            GET_HOSPITAL_INFORMATION => self.get_hospital_information(args),
            BOOK_APPOINTMENT => self.book_appointment(args),
            _ => Err(SupervisorError::UnknownTool {
                name: name.to_string(),
            }),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!(tool = %name, category = e.category().as_str(), error = %e, "tool failed");
            e.into()
        })
    }

    fn get_patient_details(&self, args: &Value) -> Result<ToolOutcome, SupervisorError> {
        let args: PatientDetailsArgs = typed_args(GET_PATIENT_DETAILS, args)?;
        let record = self
            .data
            .find_patient(&args.patient_id)
            .ok_or(SupervisorError::PatientNotFound {
                patient_id: args.patient_id,
            })?;
        let value = serde_json::to_value(&record).map_err(|e| SupervisorError::ToolResultEncode {
            tool: GET_PATIENT_DETAILS.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ToolOutcome::success("data", value))
    }

    fn get_hospital_information(&self, args: &Value) -> Result<ToolOutcome, SupervisorError> {
        let _args: HospitalInfoArgs = typed_args(GET_HOSPITAL_INFORMATION, args)?;
        Ok(ToolOutcome::success(
            "information",
            Value::String(self.data.hospital_info().to_string()),
        ))
    }

    fn book_appointment(&self, args: &Value) -> Result<ToolOutcome, SupervisorError> {
        let args: BookAppointmentArgs = typed_args(BOOK_APPOINTMENT, args)?;
        tracing::info!(
            provider = %args.provider_name,
            appointment_type = %args.appointment_type,
            location = %args.location,
            date_time = %args.date_time,
            "booking appointment"
        );
        let message = format!(
            "Appointment confirmed for {} with {} at {} on {}.",
            args.patient_name, args.provider_name, args.location, args.date_time
        );
        Ok(ToolOutcome::success("confirmation_message", Value::String(message)))
    }
}

/// Parse a raw argument payload into a JSON object.
fn decode_arguments(tool: &str, raw: &str) -> Result<Value, SupervisorError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| SupervisorError::ArgumentDecode {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn typed_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, SupervisorError> {
    T::deserialize(args).map_err(|e| SupervisorError::ArgumentDecode {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

// ─── Catalog ────────────────────────────────────────────────────────────────

/// JSON-schema definitions for the supervisor's tools.
pub fn supervisor_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            GET_PATIENT_DETAILS,
            "Retrieves a patient's details, including referrals and appointment history, \
             using their unique patient ID.",
            json!({
                "type": "object",
                "properties": {
                    "patient_id": {
                        "type": "string",
                        "description": "The unique ID of the patient."
                    }
                },
                "required": ["patient_id"]
            }),
        ),
        ToolDefinition::function(
            GET_HOSPITAL_INFORMATION,
            "Retrieves general hospital information, such as provider details, accepted \
             insurances, and appointment guidelines from the hospital data sheet.",
            json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "The topic to search for (e.g., \"Provider Directory\", \"Accepted Insurances\")."
                    }
                },
                "required": ["topic"]
            }),
        ),
        ToolDefinition::function(
            BOOK_APPOINTMENT,
            "Books an appointment for a patient with a specific provider.",
            json!({
                "type": "object",
                "properties": {
                    "patient_name": { "type": "string", "description": "The patient's full name." },
                    "provider_name": { "type": "string", "description": "The provider's full name." },
                    "appointment_type": { "type": "string", "description": "Either NEW or ESTABLISHED." },
                    "location": { "type": "string", "description": "The address of the appointment." },
                    "date_time": { "type": "string", "description": "The date and time of the appointment." }
                },
                "required": ["patient_name", "provider_name", "appointment_type", "location", "date_time"]
            }),
        ),
    ]
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_core::care_data::StaticCareData;

    fn router() -> ToolRouter {
        ToolRouter::new(Arc::new(StaticCareData::demo()))
    }

    #[test]
    fn patient_details_returns_exact_record() {
        let call = router().dispatch(GET_PATIENT_DETAILS, r#"{"patient_id":"1"}"#);
        assert_eq!(call.arguments, json!({"patient_id": "1"}));
        let expected = serde_json::to_value(StaticCareData::demo().find_patient("1").unwrap()).unwrap();
        let json = call.outcome.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], expected);
    }

    #[test]
    fn unknown_patient_is_failure_without_record() {
        let json = router()
            .dispatch(GET_PATIENT_DETAILS, r#"{"patient_id":"999"}"#)
            .outcome
            .to_json();
        assert_eq!(json, json!({"success": false, "error": "Patient not found."}));
    }

    #[test]
    fn hospital_information_ignores_topic() {
        let r = router();
        let a = r.dispatch(GET_HOSPITAL_INFORMATION, r#"{"topic":"Provider Directory"}"#).outcome;
        let b = r.dispatch(GET_HOSPITAL_INFORMATION, r#"{"topic":"Accepted Insurances"}"#).outcome;
        let c = r.dispatch(GET_HOSPITAL_INFORMATION, r#"{"topic":""}"#).outcome;
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(
            a.to_json()["information"].as_str().unwrap(),
            StaticCareData::demo().hospital_info()
        );
    }

    #[test]
    fn book_appointment_interpolates_fields_verbatim() {
        let args = json!({
            "patient_name": "John Doe",
            "provider_name": "Dr. Gregory House",
            "appointment_type": "ESTABLISHED",
            "location": "101 Pine St, Greensboro, NC 27401",
            "date_time": "Monday 10am"
        });
        let json = router()
            .dispatch(BOOK_APPOINTMENT, &args.to_string())
            .outcome
            .to_json();
        assert_eq!(json["success"], true);
        assert_eq!(
            json["confirmation_message"],
            "Appointment confirmed for John Doe with Dr. Gregory House at \
             101 Pine St, Greensboro, NC 27401 on Monday 10am."
        );
    }

    #[test]
    fn unknown_tool_is_informational_stub() {
        let json = router().dispatch("cancel_appointment", "{}").outcome.to_json();
        assert_eq!(json, json!({"result": "Unknown function: cancel_appointment"}));
    }

    #[test]
    fn malformed_arguments_fail_the_call() {
        let raw = r#"{"patient_id": "1""#;
        let call = router().dispatch(GET_PATIENT_DETAILS, raw);
        assert!(!call.outcome.is_success());
        assert_eq!(call.arguments, Value::String(raw.to_string()));
        let json = call.outcome.to_json();
        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments for 'get_patient_details'"));
    }

    #[test]
    fn empty_arguments_are_an_empty_object() {
        assert_eq!(decode_arguments("t", "").unwrap(), json!({}));
        // Empty object then fails the required-field check, not the JSON parse.
        let json = router().dispatch(GET_PATIENT_DETAILS, "").outcome.to_json();
        assert!(json["error"].as_str().unwrap().contains("patient_id"));
    }

    #[test]
    fn encode_failure_is_reported_as_failed_call() {
        let err = SupervisorError::ToolResultEncode {
            tool: GET_PATIENT_DETAILS.to_string(),
            reason: "key must be a string".into(),
        };
        let json = ToolOutcome::from(err).to_json();
        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to encode result of 'get_patient_details'"));
    }

    #[test]
    fn catalog_lists_three_function_tools() {
        let r = router();
        let names: Vec<&str> = r.catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, [GET_PATIENT_DETAILS, GET_HOSPITAL_INFORMATION, BOOK_APPOINTMENT]);
        assert!(r.catalog().iter().all(|t| t.r#type == "function"));
        assert_eq!(
            r.catalog()[2].parameters["required"].as_array().unwrap().len(),
            5
        );
    }
}
