//! Visit type database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::VisitType;

impl Database {
    /// Insert a new visit type.
    pub fn insert_visit_type(&self, visit_type: &VisitType) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO visit_types (
                id, name, offset_days, window_minus_days, window_plus_days,
                default_duration_minutes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                visit_type.id,
                visit_type.name,
                visit_type.offset_days,
                visit_type.window_minus_days,
                visit_type.window_plus_days,
                visit_type.default_duration_minutes,
                visit_type.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a visit type by ID.
    pub fn get_visit_type(&self, id: &str) -> DbResult<Option<VisitType>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, offset_days, window_minus_days, window_plus_days,
                       default_duration_minutes, created_at
                FROM visit_types
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(VisitType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        offset_days: row.get(2)?,
                        window_minus_days: row.get(3)?,
                        window_plus_days: row.get(4)?,
                        default_duration_minutes: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all visit types.
    pub fn list_visit_types(&self) -> DbResult<Vec<VisitType>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, offset_days, window_minus_days, window_plus_days,
                   default_duration_minutes, created_at
            FROM visit_types
            ORDER BY offset_days, name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(VisitType {
                id: row.get(0)?,
                name: row.get(1)?,
                offset_days: row.get(2)?,
                window_minus_days: row.get(3)?,
                window_plus_days: row.get(4)?,
                default_duration_minutes: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a visit type.
    pub fn delete_visit_type(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM visit_types WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
