//! Schema versioning for the records database.
//!
//! Versions are tracked in `PRAGMA user_version`; each step is applied
//! inside one transaction so a failed upgrade leaves the previous
//! version intact.

use anyhow::Result;
use rusqlite::Connection;

const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS allergies (
    id          TEXT PRIMARY KEY,
    patient_id  TEXT NOT NULL,
    substance   TEXT NOT NULL,
    severity    TEXT NOT NULL,
    reaction    TEXT NOT NULL DEFAULT '',
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_allergies_patient ON allergies(patient_id);

CREATE TABLE IF NOT EXISTS vaccinations (
    id              TEXT PRIMARY KEY,
    patient_id      TEXT NOT NULL,
    vaccine         TEXT NOT NULL,
    dose            TEXT NOT NULL DEFAULT '',
    administered_on TEXT NOT NULL,
    facility_name   TEXT NOT NULL DEFAULT '',
    recorded_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_vaccinations_patient ON vaccinations(patient_id);

CREATE TABLE IF NOT EXISTS history_entries (
    id          TEXT PRIMARY KEY,
    patient_id  TEXT NOT NULL,
    title       TEXT NOT NULL,
    details     TEXT NOT NULL DEFAULT '',
    occurred_on TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_history_patient ON history_entries(patient_id);

CREATE TABLE IF NOT EXISTS documents (
    id          TEXT PRIMARY KEY,
    patient_id  TEXT NOT NULL,
    file_name   TEXT NOT NULL,
    mime_type   TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    storage_ref TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_patient ON documents(patient_id);

CREATE TABLE IF NOT EXISTS appointments (
    id            TEXT PRIMARY KEY,
    patient_id    TEXT NOT NULL,
    facility_id   INTEGER NOT NULL,
    doctor_name   TEXT NOT NULL DEFAULT '',
    reason        TEXT NOT NULL DEFAULT '',
    scheduled_for TEXT NOT NULL,
    recorded_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);

CREATE TABLE IF NOT EXISTS emergency_requests (
    id          TEXT PRIMARY KEY,
    full_name   TEXT NOT NULL,
    phone       TEXT NOT NULL,
    description TEXT NOT NULL,
    longitude   REAL,
    latitude    REAL,
    facility_id INTEGER,
    created_at  TEXT NOT NULL
);
"#;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < 1 {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(SCHEMA_V1)?;
        tx.pragma_update(None, "user_version", 1)?;
        tx.commit()?;
        tracing::info!("records schema migrated to v1");
    }

    Ok(())
}
