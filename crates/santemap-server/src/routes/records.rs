//! Patient record CRUD endpoints.
//!
//! Records are scoped by the `patient_id` path segment; the server
//! assigns ids and `recorded_at` timestamps on creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use santemap_schema::{Allergy, AllergySeverity, Appointment, HistoryEntry, PatientDocument, Vaccination};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{patient_id}/allergies",
            get(list_allergies).post(create_allergy),
        )
        .route(
            "/{patient_id}/allergies/{record_id}",
            put(update_allergy).delete(delete_allergy),
        )
        .route(
            "/{patient_id}/vaccinations",
            get(list_vaccinations).post(create_vaccination),
        )
        .route(
            "/{patient_id}/vaccinations/{record_id}",
            put(update_vaccination).delete(delete_vaccination),
        )
        .route(
            "/{patient_id}/history",
            get(list_history).post(create_history),
        )
        .route(
            "/{patient_id}/history/{record_id}",
            put(update_history).delete(delete_history),
        )
        .route(
            "/{patient_id}/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/{patient_id}/documents/{record_id}",
            put(update_document).delete(delete_document),
        )
        .route(
            "/{patient_id}/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/{patient_id}/appointments/{record_id}",
            put(update_appointment).delete(delete_appointment),
        )
}

fn internal(err: anyhow::Error) -> StatusCode {
    tracing::error!("record store failure: {err:#}");
    StatusCode::INTERNAL_SERVER_ERROR
}

// ============================================================
// Allergies
// ============================================================

#[derive(Debug, Deserialize)]
pub struct AllergyPayload {
    pub substance: String,
    pub severity: AllergySeverity,
    #[serde(default)]
    pub reaction: String,
}

async fn list_allergies(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Allergy>>, StatusCode> {
    state
        .store
        .list_allergies(&patient_id)
        .await
        .map(Json)
        .map_err(internal)
}

async fn create_allergy(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(payload): Json<AllergyPayload>,
) -> Result<(StatusCode, Json<Allergy>), StatusCode> {
    let record = Allergy {
        id: Uuid::new_v4(),
        patient_id,
        substance: payload.substance,
        severity: payload.severity,
        reaction: payload.reaction,
        recorded_at: Utc::now(),
    };
    state
        .store
        .insert_allergy(record.clone())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_allergy(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
    Json(payload): Json<AllergyPayload>,
) -> Result<StatusCode, StatusCode> {
    let record = Allergy {
        id: record_id,
        patient_id,
        substance: payload.substance,
        severity: payload.severity,
        reaction: payload.reaction,
        recorded_at: Utc::now(),
    };
    let changed = state.store.update_allergy(record).await.map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn delete_allergy(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let changed = state
        .store
        .delete_allergy(&patient_id, record_id)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ============================================================
// Vaccinations
// ============================================================

#[derive(Debug, Deserialize)]
pub struct VaccinationPayload {
    pub vaccine: String,
    #[serde(default)]
    pub dose: String,
    pub administered_on: DateTime<Utc>,
    #[serde(default)]
    pub facility_name: String,
}

async fn list_vaccinations(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Vaccination>>, StatusCode> {
    state
        .store
        .list_vaccinations(&patient_id)
        .await
        .map(Json)
        .map_err(internal)
}

async fn create_vaccination(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(payload): Json<VaccinationPayload>,
) -> Result<(StatusCode, Json<Vaccination>), StatusCode> {
    let record = Vaccination {
        id: Uuid::new_v4(),
        patient_id,
        vaccine: payload.vaccine,
        dose: payload.dose,
        administered_on: payload.administered_on,
        facility_name: payload.facility_name,
        recorded_at: Utc::now(),
    };
    state
        .store
        .insert_vaccination(record.clone())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_vaccination(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
    Json(payload): Json<VaccinationPayload>,
) -> Result<StatusCode, StatusCode> {
    let record = Vaccination {
        id: record_id,
        patient_id,
        vaccine: payload.vaccine,
        dose: payload.dose,
        administered_on: payload.administered_on,
        facility_name: payload.facility_name,
        recorded_at: Utc::now(),
    };
    let changed = state
        .store
        .update_vaccination(record)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn delete_vaccination(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let changed = state
        .store
        .delete_vaccination(&patient_id, record_id)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ============================================================
// Medical history
// ============================================================

#[derive(Debug, Deserialize)]
pub struct HistoryPayload {
    pub title: String,
    #[serde(default)]
    pub details: String,
    pub occurred_on: DateTime<Utc>,
}

async fn list_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, StatusCode> {
    state
        .store
        .list_history_entries(&patient_id)
        .await
        .map(Json)
        .map_err(internal)
}

async fn create_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(payload): Json<HistoryPayload>,
) -> Result<(StatusCode, Json<HistoryEntry>), StatusCode> {
    let record = HistoryEntry {
        id: Uuid::new_v4(),
        patient_id,
        title: payload.title,
        details: payload.details,
        occurred_on: payload.occurred_on,
        recorded_at: Utc::now(),
    };
    state
        .store
        .insert_history_entry(record.clone())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_history(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
    Json(payload): Json<HistoryPayload>,
) -> Result<StatusCode, StatusCode> {
    let record = HistoryEntry {
        id: record_id,
        patient_id,
        title: payload.title,
        details: payload.details,
        occurred_on: payload.occurred_on,
        recorded_at: Utc::now(),
    };
    let changed = state
        .store
        .update_history_entry(record)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn delete_history(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let changed = state
        .store
        .delete_history_entry(&patient_id, record_id)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ============================================================
// Documents
// ============================================================

#[derive(Debug, Deserialize)]
pub struct DocumentPayload {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub description: String,
    pub storage_ref: String,
}

async fn list_documents(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<PatientDocument>>, StatusCode> {
    state
        .store
        .list_documents(&patient_id)
        .await
        .map(Json)
        .map_err(internal)
}

async fn create_document(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(payload): Json<DocumentPayload>,
) -> Result<(StatusCode, Json<PatientDocument>), StatusCode> {
    let record = PatientDocument {
        id: Uuid::new_v4(),
        patient_id,
        file_name: payload.file_name,
        mime_type: payload.mime_type,
        description: payload.description,
        storage_ref: payload.storage_ref,
        recorded_at: Utc::now(),
    };
    state
        .store
        .insert_document(record.clone())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_document(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
    Json(payload): Json<DocumentPayload>,
) -> Result<StatusCode, StatusCode> {
    let record = PatientDocument {
        id: record_id,
        patient_id,
        file_name: payload.file_name,
        mime_type: payload.mime_type,
        description: payload.description,
        storage_ref: payload.storage_ref,
        recorded_at: Utc::now(),
    };
    let changed = state
        .store
        .update_document(record)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn delete_document(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let changed = state
        .store
        .delete_document(&patient_id, record_id)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

// ============================================================
// Appointments
// ============================================================

#[derive(Debug, Deserialize)]
pub struct AppointmentPayload {
    pub facility_id: u32,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub reason: String,
    pub scheduled_for: DateTime<Utc>,
}

async fn list_appointments(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Appointment>>, StatusCode> {
    state
        .store
        .list_appointments(&patient_id)
        .await
        .map(Json)
        .map_err(internal)
}

async fn create_appointment(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(payload): Json<AppointmentPayload>,
) -> Result<(StatusCode, Json<Appointment>), StatusCode> {
    let record = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        facility_id: payload.facility_id,
        doctor_name: payload.doctor_name,
        reason: payload.reason,
        scheduled_for: payload.scheduled_for,
        recorded_at: Utc::now(),
    };
    state
        .store
        .insert_appointment(record.clone())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_appointment(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
    Json(payload): Json<AppointmentPayload>,
) -> Result<StatusCode, StatusCode> {
    let record = Appointment {
        id: record_id,
        patient_id,
        facility_id: payload.facility_id,
        doctor_name: payload.doctor_name,
        reason: payload.reason,
        scheduled_for: payload.scheduled_for,
        recorded_at: Utc::now(),
    };
    let changed = state
        .store
        .update_appointment(record)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn delete_appointment(
    State(state): State<AppState>,
    Path((patient_id, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let changed = state
        .store
        .delete_appointment(&patient_id, record_id)
        .await
        .map_err(internal)?;
    if changed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
