use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (longitude, latitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityCategory {
    Public,
    Private,
}

impl Default for FacilityCategory {
    fn default() -> Self {
        Self::Public
    }
}

/// One health facility from the directory catalog.
///
/// `facility_type` is deliberately free text ("Hôpital National",
/// "Centre de Santé", ...) — the filter engine classifies it by
/// substring, not by enum. Records are immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: u32,
    pub name: String,
    pub facility_type: String,
    #[serde(default)]
    pub category: FacilityCategory,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub position: Coordinate,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub doctors: u32,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub has_emergency: bool,
    #[serde(default)]
    pub has_blood_bank: bool,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================
// Patient record payloads (CRUD over the records store)
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergySeverity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allergy {
    pub id: Uuid,
    pub patient_id: String,
    pub substance: String,
    pub severity: AllergySeverity,
    #[serde(default)]
    pub reaction: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaccination {
    pub id: Uuid,
    pub patient_id: String,
    pub vaccine: String,
    #[serde(default)]
    pub dose: String,
    pub administered_on: DateTime<Utc>,
    #[serde(default)]
    pub facility_name: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub patient_id: String,
    pub title: String,
    #[serde(default)]
    pub details: String,
    pub occurred_on: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDocument {
    pub id: Uuid,
    pub patient_id: String,
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub description: String,
    /// Opaque reference into external storage; the store never holds bytes.
    pub storage_ref: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: String,
    pub facility_id: u32,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub reason: String,
    pub scheduled_for: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

/// Emergency-request intake form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub facility_id: Option<u32>,
    pub created_at: DateTime<Utc>,
}
