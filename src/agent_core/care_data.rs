//! Read-only care data behind the supervisor's tools.
//!
//! [`StaticCareData`] holds the fictional demo patient and hospital sheet.
//! Swapping in a real datastore means implementing [`CareDataProvider`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─── Types ──────────────────────────────────────────────────────────────────

/// A referral linking the patient to a specialty, optionally to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub specialty: String,
}

/// Outcome of a past appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Completed,
    Noshow,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentHistoryEntry {
    pub date: String,
    pub time: String,
    pub provider: String,
    pub status: AppointmentStatus,
}

/// Everything the supervisor knows about one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub dob: String,
    /// Primary care provider.
    pub pcp: String,
    #[serde(rename = "ehrId")]
    pub ehr_id: String,
    pub referred_providers: Vec<Referral>,
    pub appointments: Vec<AppointmentHistoryEntry>,
}

// ─── Provider seam ──────────────────────────────────────────────────────────

/// Source of patient records and hospital reference text.
///
/// Implementations are shared across concurrent runs without locking, so
/// they must be read-only or internally synchronized.
pub trait CareDataProvider: Send + Sync {
    /// Look up a patient by their stable string id.
    fn find_patient(&self, patient_id: &str) -> Option<PatientRecord>;

    /// The hospital sheet: provider directory, insurances, self-pay prices.
    fn hospital_info(&self) -> &str;
}

// ─── Static demo data ───────────────────────────────────────────────────────

const HOSPITAL_INFO: &str = "
Provider Directory
- Grey, Meredith
  - specialty: Primary Care
  - department:
    - name: Sloan Primary Care
    - address: 202 Maple St, Winston-Salem, NC 27101
    - hours: M-F 9am-5pm
- House, Gregory
  - specialty: Orthopedics
  - department:
    - name: PPTH Orthopedics
    - address: 101 Pine St, Greensboro, NC 27401
    - hours: M-W 9am-5pm
  - department:
    - name: Jefferson Hospital
    - address: 202 Maple St, Claremont, NC 28610
    - hours: Th-F 9am-5pm
- Yang, Cristina
  - specialty: Surgery
  - department:
    - name: Seattle Grace Cardiac Surgery
    - address: 456 Elm St, Charlotte, NC 28202
    - hours: M-F 9am-5pm
- Brennan, Temperance
  - specialty: Orthopedics
  - department:
    - name: Jefferson Hospital
    - address: 202 Maple St, Claremont, NC 28610
    - hours: Tu-Th 10am-4pm

Accepted Insurances:
- Medicaid
- United Health Care
- Blue Cross Blue Shield of North Carolina
- Aetna
- Cigna

Self-pay:
- Primary Care: $150
- Orthopedics: $300
- Surgery: $1000
";

/// In-memory demo data: one patient and the hospital sheet.
#[derive(Debug, Clone)]
pub struct StaticCareData {
    patients: HashMap<String, PatientRecord>,
    hospital_info: String,
}

impl StaticCareData {
    /// Build a provider from explicit records and hospital text.
    pub fn new(patients: Vec<PatientRecord>, hospital_info: impl Into<String>) -> Self {
        Self {
            patients: patients.into_iter().map(|p| (p.id.clone(), p)).collect(),
            hospital_info: hospital_info.into(),
        }
    }

    /// The fictional Kouper Health demo data set.
    pub fn demo() -> Self {
        Self::new(vec![john_doe()], HOSPITAL_INFO)
    }

    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }
}

impl Default for StaticCareData {
    fn default() -> Self {
        Self::demo()
    }
}

impl CareDataProvider for StaticCareData {
    fn find_patient(&self, patient_id: &str) -> Option<PatientRecord> {
        self.patients.get(patient_id).cloned()
    }

    fn hospital_info(&self) -> &str {
        &self.hospital_info
    }
}

fn john_doe() -> PatientRecord {
    let visit = |date: &str, time: &str, provider: &str, status| AppointmentHistoryEntry {
        date: date.to_string(),
        time: time.to_string(),
        provider: provider.to_string(),
        status,
    };

    PatientRecord {
        id: "1".to_string(),
        name: "John Doe".to_string(),
        dob: "01/01/1975".to_string(),
        pcp: "Dr. Meredith Grey".to_string(),
        ehr_id: "1234abcd".to_string(),
        referred_providers: vec![
            Referral {
                provider: Some("House, Gregory MD".to_string()),
                specialty: "Orthopedics".to_string(),
            },
            Referral {
                provider: None,
                specialty: "Primary Care".to_string(),
            },
        ],
        appointments: vec![
            visit("3/05/18", "9:15am", "Dr. Meredith Grey", AppointmentStatus::Completed),
            visit("8/12/24", "2:30pm", "Dr. Gregory House", AppointmentStatus::Completed),
            visit("9/17/24", "10:00am", "Dr. Meredith Grey", AppointmentStatus::Noshow),
            visit("11/25/24", "11:30am", "Dr. Meredith Grey", AppointmentStatus::Cancelled),
        ],
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
