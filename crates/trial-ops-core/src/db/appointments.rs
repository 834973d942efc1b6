//! Appointment database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Appointment;

impl Database {
    /// Insert a new appointment.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO appointments (
                id, patient_id, title, start_at, duration_minutes,
                resource_id, resource_label, visit_type_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                appointment.id,
                appointment.patient_id,
                appointment.title,
                appointment.start_at,
                appointment.duration_minutes,
                appointment.resource_id,
                appointment.resource_label,
                appointment.visit_type_id,
                appointment.created_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing appointment.
    pub fn update_appointment(&self, appointment: &Appointment) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments SET
                patient_id = ?2,
                title = ?3,
                start_at = ?4,
                duration_minutes = ?5,
                resource_id = ?6,
                resource_label = ?7,
                visit_type_id = ?8
            WHERE id = ?1
            "#,
            params![
                appointment.id,
                appointment.patient_id,
                appointment.title,
                appointment.start_at,
                appointment.duration_minutes,
                appointment.resource_id,
                appointment.resource_label,
                appointment.visit_type_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, title, start_at, duration_minutes,
                       resource_id, resource_label, visit_type_id, created_at
                FROM appointments
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(Appointment {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        title: row.get(2)?,
                        start_at: row.get(3)?,
                        duration_minutes: row.get(4)?,
                        resource_id: row.get(5)?,
                        resource_label: row.get(6)?,
                        visit_type_id: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all appointments for a patient, soonest first.
    pub fn list_appointments_for_patient(&self, patient_id: &str) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, title, start_at, duration_minutes,
                   resource_id, resource_label, visit_type_id, created_at
            FROM appointments
            WHERE patient_id = ?
            ORDER BY start_at
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                title: row.get(2)?,
                start_at: row.get(3)?,
                duration_minutes: row.get(4)?,
                resource_id: row.get(5)?,
                resource_label: row.get(6)?,
                visit_type_id: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List appointments whose start falls in `[from, to)`.
    ///
    /// Bounds are RFC 3339 UTC strings; their lexical order matches
    /// chronological order, so this compares directly on the column.
    pub fn list_appointments_between(&self, from: &str, to: &str) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, title, start_at, duration_minutes,
                   resource_id, resource_label, visit_type_id, created_at
            FROM appointments
            WHERE start_at >= ?1 AND start_at < ?2
            ORDER BY start_at
            "#,
        )?;

        let rows = stmt.query_map(params![from, to], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                title: row.get(2)?,
                start_at: row.get(3)?,
                duration_minutes: row.get(4)?,
                resource_id: row.get(5)?,
                resource_label: row.get(6)?,
                visit_type_id: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List appointments that could conflict with a candidate: every row
    /// sharing the candidate's patient, or its resource when one is given.
    ///
    /// `exclude_id` drops one appointment from the result (the row being
    /// rescheduled).
    pub fn list_conflict_candidates(
        &self,
        patient_id: &str,
        resource_id: Option<&str>,
        exclude_id: Option<&str>,
    ) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, title, start_at, duration_minutes,
                   resource_id, resource_label, visit_type_id, created_at
            FROM appointments
            WHERE (patient_id = ?1
                   OR (resource_id IS NOT NULL AND ?2 IS NOT NULL AND resource_id = ?2))
              AND (?3 IS NULL OR id <> ?3)
            "#,
        )?;

        let rows = stmt.query_map(params![patient_id, resource_id, exclude_id], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                title: row.get(2)?,
                start_at: row.get(3)?,
                duration_minutes: row.get(4)?,
                resource_id: row.get(5)?,
                resource_label: row.get(6)?,
                visit_type_id: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an appointment.
    pub fn delete_appointment(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
