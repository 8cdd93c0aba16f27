//! Normalized profile payloads. The backend's field set is not contractually
//! fixed, so everything is optional and extraction goes through the adapter
//! helpers rather than a strict deserialize.

use serde::Serialize;
use serde_json::Value;

use super::adapters::field_string;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Present only for the patient alias.
    pub patient: Option<PatientDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientDetails {
    pub date_of_birth: Option<String>,
    pub blood_type: Option<String>,
    /// Comma-delimited, passed through unparsed.
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_access_code: Option<String>,
}

impl UserProfile {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: field_string(v, "id"),
            email: field_string(v, "email"),
            first_name: field_string(v, "first_name"),
            last_name: field_string(v, "last_name"),
            phone: field_string(v, "phone"),
            patient: None,
        }
    }

    /// Stand-in when resolution fails entirely.
    pub fn placeholder() -> Self {
        Self { email: Some("unknown@user".to_string()), ..Self::default() }
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => self.email.clone().unwrap_or_else(|| "unknown@user".to_string()),
        }
    }
}

impl PatientDetails {
    pub fn from_value(v: &Value) -> Self {
        Self {
            date_of_birth: field_string(v, "date_of_birth"),
            blood_type: field_string(v, "blood_type"),
            allergies: field_string(v, "allergies"),
            emergency_contact: field_string(v, "emergency_contact"),
            emergency_access_code: field_string(v, "emergency_access_code"),
        }
    }
}
