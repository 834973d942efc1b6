//! Audit log database operations.
//!
//! Audit rows are append-only; the core only ever inserts and lists.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::AuditEntry;

impl Database {
    /// Insert a new audit entry.
    pub fn insert_audit(&self, entry: &AuditEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO audit_logs (id, actor, action, entity, entity_id, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.id,
                entry.actor,
                entry.action,
                entry.entity,
                entry.entity_id,
                entry.payload,
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    /// List the most recent audit entries, newest first.
    pub fn list_recent_audit(&self, limit: usize) -> DbResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, actor, action, entity, entity_id, payload, created_at
            FROM audit_logs
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(AuditEntry {
                id: row.get(0)?,
                actor: row.get(1)?,
                action: row.get(2)?,
                entity: row.get(3)?,
                entity_id: row.get(4)?,
                payload: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
