//! Sqlite-backed store for patient self-service records and emergency
//! intake.
//!
//! Every record type is scoped by an opaque `patient_id` supplied by the
//! caller; authentication happens upstream. The connection lives behind
//! a mutex and every operation runs on the blocking pool.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use santemap_schema::{
    Allergy, AllergySeverity, Appointment, Coordinate, EmergencyRequest, HistoryEntry,
    PatientDocument, Vaccination,
};
use std::sync::{Arc, Mutex};
use tokio::task;
use uuid::Uuid;

use crate::migrations::run_migrations;

#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Mutex<Connection>>,
}

impl RecordStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            f(&conn)
        })
        .await?
    }

    // ============================================================
    // Allergies
    // ============================================================

    pub async fn insert_allergy(&self, allergy: Allergy) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO allergies (id, patient_id, substance, severity, reaction, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    allergy.id.to_string(),
                    allergy.patient_id,
                    allergy.substance,
                    severity_to_str(allergy.severity),
                    allergy.reaction,
                    allergy.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_allergies(&self, patient_id: &str) -> Result<Vec<Allergy>> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, patient_id, substance, severity, reaction, recorded_at
                FROM allergies WHERE patient_id = ?1 ORDER BY recorded_at DESC
                "#,
            )?;
            let rows = stmt.query_map(params![patient_id], row_to_allergy)?;
            collect(rows)
        })
        .await
    }

    pub async fn update_allergy(&self, allergy: Allergy) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                r#"
                UPDATE allergies SET substance = ?3, severity = ?4, reaction = ?5
                WHERE id = ?1 AND patient_id = ?2
                "#,
                params![
                    allergy.id.to_string(),
                    allergy.patient_id,
                    allergy.substance,
                    severity_to_str(allergy.severity),
                    allergy.reaction,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn delete_allergy(&self, patient_id: &str, id: Uuid) -> Result<bool> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM allergies WHERE id = ?1 AND patient_id = ?2",
                params![id.to_string(), patient_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    // ============================================================
    // Vaccinations
    // ============================================================

    pub async fn insert_vaccination(&self, vaccination: Vaccination) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO vaccinations
                    (id, patient_id, vaccine, dose, administered_on, facility_name, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    vaccination.id.to_string(),
                    vaccination.patient_id,
                    vaccination.vaccine,
                    vaccination.dose,
                    vaccination.administered_on.to_rfc3339(),
                    vaccination.facility_name,
                    vaccination.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_vaccinations(&self, patient_id: &str) -> Result<Vec<Vaccination>> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, patient_id, vaccine, dose, administered_on, facility_name, recorded_at
                FROM vaccinations WHERE patient_id = ?1 ORDER BY administered_on DESC
                "#,
            )?;
            let rows = stmt.query_map(params![patient_id], row_to_vaccination)?;
            collect(rows)
        })
        .await
    }

    pub async fn update_vaccination(&self, vaccination: Vaccination) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                r#"
                UPDATE vaccinations
                SET vaccine = ?3, dose = ?4, administered_on = ?5, facility_name = ?6
                WHERE id = ?1 AND patient_id = ?2
                "#,
                params![
                    vaccination.id.to_string(),
                    vaccination.patient_id,
                    vaccination.vaccine,
                    vaccination.dose,
                    vaccination.administered_on.to_rfc3339(),
                    vaccination.facility_name,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn delete_vaccination(&self, patient_id: &str, id: Uuid) -> Result<bool> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM vaccinations WHERE id = ?1 AND patient_id = ?2",
                params![id.to_string(), patient_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    // ============================================================
    // Medical history
    // ============================================================

    pub async fn insert_history_entry(&self, entry: HistoryEntry) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO history_entries
                    (id, patient_id, title, details, occurred_on, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    entry.id.to_string(),
                    entry.patient_id,
                    entry.title,
                    entry.details,
                    entry.occurred_on.to_rfc3339(),
                    entry.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_history_entries(&self, patient_id: &str) -> Result<Vec<HistoryEntry>> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, patient_id, title, details, occurred_on, recorded_at
                FROM history_entries WHERE patient_id = ?1 ORDER BY occurred_on DESC
                "#,
            )?;
            let rows = stmt.query_map(params![patient_id], row_to_history_entry)?;
            collect(rows)
        })
        .await
    }

    pub async fn update_history_entry(&self, entry: HistoryEntry) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                r#"
                UPDATE history_entries SET title = ?3, details = ?4, occurred_on = ?5
                WHERE id = ?1 AND patient_id = ?2
                "#,
                params![
                    entry.id.to_string(),
                    entry.patient_id,
                    entry.title,
                    entry.details,
                    entry.occurred_on.to_rfc3339(),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn delete_history_entry(&self, patient_id: &str, id: Uuid) -> Result<bool> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM history_entries WHERE id = ?1 AND patient_id = ?2",
                params![id.to_string(), patient_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    // ============================================================
    // Documents
    // ============================================================

    pub async fn insert_document(&self, document: PatientDocument) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO documents
                    (id, patient_id, file_name, mime_type, description, storage_ref, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    document.id.to_string(),
                    document.patient_id,
                    document.file_name,
                    document.mime_type,
                    document.description,
                    document.storage_ref,
                    document.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_documents(&self, patient_id: &str) -> Result<Vec<PatientDocument>> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, patient_id, file_name, mime_type, description, storage_ref, recorded_at
                FROM documents WHERE patient_id = ?1 ORDER BY recorded_at DESC
                "#,
            )?;
            let rows = stmt.query_map(params![patient_id], row_to_document)?;
            collect(rows)
        })
        .await
    }

    pub async fn update_document(&self, document: PatientDocument) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                r#"
                UPDATE documents SET file_name = ?3, mime_type = ?4, description = ?5
                WHERE id = ?1 AND patient_id = ?2
                "#,
                params![
                    document.id.to_string(),
                    document.patient_id,
                    document.file_name,
                    document.mime_type,
                    document.description,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn delete_document(&self, patient_id: &str, id: Uuid) -> Result<bool> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM documents WHERE id = ?1 AND patient_id = ?2",
                params![id.to_string(), patient_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    // ============================================================
    // Appointments
    // ============================================================

    pub async fn insert_appointment(&self, appointment: Appointment) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO appointments
                    (id, patient_id, facility_id, doctor_name, reason, scheduled_for, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    appointment.id.to_string(),
                    appointment.patient_id,
                    appointment.facility_id,
                    appointment.doctor_name,
                    appointment.reason,
                    appointment.scheduled_for.to_rfc3339(),
                    appointment.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_appointments(&self, patient_id: &str) -> Result<Vec<Appointment>> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, patient_id, facility_id, doctor_name, reason, scheduled_for, recorded_at
                FROM appointments WHERE patient_id = ?1 ORDER BY scheduled_for ASC
                "#,
            )?;
            let rows = stmt.query_map(params![patient_id], row_to_appointment)?;
            collect(rows)
        })
        .await
    }

    pub async fn update_appointment(&self, appointment: Appointment) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                r#"
                UPDATE appointments
                SET facility_id = ?3, doctor_name = ?4, reason = ?5, scheduled_for = ?6
                WHERE id = ?1 AND patient_id = ?2
                "#,
                params![
                    appointment.id.to_string(),
                    appointment.patient_id,
                    appointment.facility_id,
                    appointment.doctor_name,
                    appointment.reason,
                    appointment.scheduled_for.to_rfc3339(),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn delete_appointment(&self, patient_id: &str, id: Uuid) -> Result<bool> {
        let patient_id = patient_id.to_owned();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM appointments WHERE id = ?1 AND patient_id = ?2",
                params![id.to_string(), patient_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    // ============================================================
    // Emergency intake
    // ============================================================

    pub async fn insert_emergency_request(&self, request: EmergencyRequest) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO emergency_requests
                    (id, full_name, phone, description, longitude, latitude, facility_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    request.id.to_string(),
                    request.full_name,
                    request.phone,
                    request.description,
                    request.location.map(|c| c.longitude),
                    request.location.map(|c| c.latitude),
                    request.facility_id,
                    request.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_emergency_requests(&self) -> Result<Vec<EmergencyRequest>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, full_name, phone, description, longitude, latitude, facility_id, created_at
                FROM emergency_requests ORDER BY created_at DESC
                "#,
            )?;
            let rows = stmt.query_map([], row_to_emergency_request)?;
            collect(rows)
        })
        .await
    }
}

// ============================================================
// Row mappers
// ============================================================

fn collect<T>(
    rows: rusqlite::MappedRows<'_, impl FnMut(&Row<'_>) -> rusqlite::Result<T>>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn conversion_err(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_err(idx, e))
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn severity_to_str(severity: AllergySeverity) -> &'static str {
    match severity {
        AllergySeverity::Mild => "mild",
        AllergySeverity::Moderate => "moderate",
        AllergySeverity::Severe => "severe",
    }
}

fn get_severity(row: &Row<'_>, idx: usize) -> rusqlite::Result<AllergySeverity> {
    let raw: String = row.get(idx)?;
    match raw.as_str() {
        "mild" => Ok(AllergySeverity::Mild),
        "moderate" => Ok(AllergySeverity::Moderate),
        "severe" => Ok(AllergySeverity::Severe),
        other => Err(conversion_err(
            idx,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown severity: {other}"),
            ),
        )),
    }
}

fn row_to_allergy(row: &Row<'_>) -> rusqlite::Result<Allergy> {
    Ok(Allergy {
        id: get_uuid(row, 0)?,
        patient_id: row.get(1)?,
        substance: row.get(2)?,
        severity: get_severity(row, 3)?,
        reaction: row.get(4)?,
        recorded_at: get_ts(row, 5)?,
    })
}

fn row_to_vaccination(row: &Row<'_>) -> rusqlite::Result<Vaccination> {
    Ok(Vaccination {
        id: get_uuid(row, 0)?,
        patient_id: row.get(1)?,
        vaccine: row.get(2)?,
        dose: row.get(3)?,
        administered_on: get_ts(row, 4)?,
        facility_name: row.get(5)?,
        recorded_at: get_ts(row, 6)?,
    })
}

fn row_to_history_entry(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: get_uuid(row, 0)?,
        patient_id: row.get(1)?,
        title: row.get(2)?,
        details: row.get(3)?,
        occurred_on: get_ts(row, 4)?,
        recorded_at: get_ts(row, 5)?,
    })
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<PatientDocument> {
    Ok(PatientDocument {
        id: get_uuid(row, 0)?,
        patient_id: row.get(1)?,
        file_name: row.get(2)?,
        mime_type: row.get(3)?,
        description: row.get(4)?,
        storage_ref: row.get(5)?,
        recorded_at: get_ts(row, 6)?,
    })
}

fn row_to_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: get_uuid(row, 0)?,
        patient_id: row.get(1)?,
        facility_id: row.get(2)?,
        doctor_name: row.get(3)?,
        reason: row.get(4)?,
        scheduled_for: get_ts(row, 5)?,
        recorded_at: get_ts(row, 6)?,
    })
}

fn row_to_emergency_request(row: &Row<'_>) -> rusqlite::Result<EmergencyRequest> {
    let longitude: Option<f64> = row.get(4)?;
    let latitude: Option<f64> = row.get(5)?;
    let location = match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Some(Coordinate {
            longitude,
            latitude,
        }),
        _ => None,
    };
    Ok(EmergencyRequest {
        id: get_uuid(row, 0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        description: row.get(3)?,
        location,
        facility_id: row.get(6)?,
        created_at: get_ts(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap()
    }

    fn allergy(patient: &str, substance: &str, hour: u32) -> Allergy {
        Allergy {
            id: Uuid::new_v4(),
            patient_id: patient.into(),
            substance: substance.into(),
            severity: AllergySeverity::Moderate,
            reaction: "urticaire".into(),
            recorded_at: ts(hour),
        }
    }

    #[tokio::test]
    async fn allergy_crud_roundtrip() {
        let store = RecordStore::open_in_memory().unwrap();
        let mut record = allergy("patient-1", "Pénicilline", 8);
        store.insert_allergy(record.clone()).await.unwrap();

        let listed = store.list_allergies("patient-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].substance, "Pénicilline");
        assert_eq!(listed[0].severity, AllergySeverity::Moderate);

        record.substance = "Amoxicilline".into();
        record.severity = AllergySeverity::Severe;
        assert!(store.update_allergy(record.clone()).await.unwrap());
        let listed = store.list_allergies("patient-1").await.unwrap();
        assert_eq!(listed[0].substance, "Amoxicilline");
        assert_eq!(listed[0].severity, AllergySeverity::Severe);

        assert!(store.delete_allergy("patient-1", record.id).await.unwrap());
        assert!(store.list_allergies("patient-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn records_are_scoped_by_patient() {
        let store = RecordStore::open_in_memory().unwrap();
        let mine = allergy("patient-1", "Arachide", 9);
        store.insert_allergy(mine.clone()).await.unwrap();
        store
            .insert_allergy(allergy("patient-2", "Latex", 10))
            .await
            .unwrap();

        assert_eq!(store.list_allergies("patient-1").await.unwrap().len(), 1);
        assert_eq!(store.list_allergies("patient-2").await.unwrap().len(), 1);

        // Deleting through the wrong patient scope must not touch the row.
        assert!(!store.delete_allergy("patient-2", mine.id).await.unwrap());
        assert_eq!(store.list_allergies("patient-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn vaccinations_listed_newest_first() {
        let store = RecordStore::open_in_memory().unwrap();
        for (vaccine, hour) in [("BCG", 8), ("Fièvre jaune", 11), ("Polio", 9)] {
            store
                .insert_vaccination(Vaccination {
                    id: Uuid::new_v4(),
                    patient_id: "patient-1".into(),
                    vaccine: vaccine.into(),
                    dose: "1".into(),
                    administered_on: ts(hour),
                    facility_name: "Centre de Santé de Matam".into(),
                    recorded_at: ts(hour),
                })
                .await
                .unwrap();
        }

        let listed = store.list_vaccinations("patient-1").await.unwrap();
        let names: Vec<&str> = listed.iter().map(|v| v.vaccine.as_str()).collect();
        assert_eq!(names, vec!["Fièvre jaune", "Polio", "BCG"]);
    }

    #[tokio::test]
    async fn history_and_documents_roundtrip() {
        let store = RecordStore::open_in_memory().unwrap();
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            patient_id: "patient-1".into(),
            title: "Paludisme".into(),
            details: "Traité en 2023".into(),
            occurred_on: ts(7),
            recorded_at: ts(8),
        };
        store.insert_history_entry(entry.clone()).await.unwrap();

        let document = PatientDocument {
            id: Uuid::new_v4(),
            patient_id: "patient-1".into(),
            file_name: "ordonnance.pdf".into(),
            mime_type: "application/pdf".into(),
            description: "Ordonnance mars".into(),
            storage_ref: "docs/ordonnance-2025-03.pdf".into(),
            recorded_at: ts(9),
        };
        store.insert_document(document.clone()).await.unwrap();

        assert_eq!(
            store.list_history_entries("patient-1").await.unwrap()[0].title,
            "Paludisme"
        );
        assert_eq!(
            store.list_documents("patient-1").await.unwrap()[0].file_name,
            "ordonnance.pdf"
        );

        assert!(store
            .delete_history_entry("patient-1", entry.id)
            .await
            .unwrap());
        assert!(store
            .delete_document("patient-1", document.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn appointment_update_and_ordering() {
        let store = RecordStore::open_in_memory().unwrap();
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: "patient-1".into(),
            facility_id: 1,
            doctor_name: "Dr Camara".into(),
            reason: "Consultation".into(),
            scheduled_for: ts(14),
            recorded_at: ts(8),
        };
        store.insert_appointment(appointment.clone()).await.unwrap();

        appointment.scheduled_for = ts(16);
        appointment.reason = "Consultation reportée".into();
        assert!(store.update_appointment(appointment.clone()).await.unwrap());

        let listed = store.list_appointments("patient-1").await.unwrap();
        assert_eq!(listed[0].reason, "Consultation reportée");
        assert_eq!(listed[0].scheduled_for, ts(16));
    }

    #[tokio::test]
    async fn update_of_unknown_record_reports_false() {
        let store = RecordStore::open_in_memory().unwrap();
        let changed = store
            .update_allergy(allergy("patient-1", "Pollen", 8))
            .await
            .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn emergency_request_with_and_without_location() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .insert_emergency_request(EmergencyRequest {
                id: Uuid::new_v4(),
                full_name: "Mamadou Diallo".into(),
                phone: "+224 620 11 22 33".into(),
                description: "Douleur thoracique".into(),
                location: Some(Coordinate {
                    longitude: -13.68,
                    latitude: 9.54,
                }),
                facility_id: Some(1),
                created_at: ts(10),
            })
            .await
            .unwrap();
        store
            .insert_emergency_request(EmergencyRequest {
                id: Uuid::new_v4(),
                full_name: "Aïssatou Barry".into(),
                phone: "+224 621 44 55 66".into(),
                description: "Fièvre élevée".into(),
                location: None,
                facility_id: None,
                created_at: ts(11),
            })
            .await
            .unwrap();

        let listed = store.list_emergency_requests().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first.
        assert_eq!(listed[0].full_name, "Aïssatou Barry");
        assert!(listed[0].location.is_none());
        let loc = listed[1].location.unwrap();
        assert!((loc.latitude - 9.54).abs() < 1e-9);
    }

    #[tokio::test]
    async fn on_disk_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let path = path.to_str().unwrap();

        {
            let store = RecordStore::open(path).unwrap();
            store
                .insert_allergy(allergy("patient-1", "Pénicilline", 8))
                .await
                .unwrap();
        }

        let store = RecordStore::open(path).unwrap();
        assert_eq!(store.list_allergies("patient-1").await.unwrap().len(), 1);
    }
}
