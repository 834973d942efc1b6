//! Best-effort audit recording.
//!
//! Audit writes are fire-and-forget: a failed write is logged and
//! discarded, and never fails or rolls back the operation it describes.

use serde_json::Value;
use tracing::warn;

use crate::db::Database;
use crate::models::AuditEntry;

/// Records mutating actions into the audit log.
pub struct AuditRecorder<'a> {
    db: &'a Database,
}

impl<'a> AuditRecorder<'a> {
    /// Create a new audit recorder.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record one audit entry.
    pub fn record(
        &self,
        actor: Option<&str>,
        action: &str,
        entity: &str,
        entity_id: Option<&str>,
        payload: Option<Value>,
    ) {
        let mut entry = AuditEntry::new(action, entity);
        entry.actor = actor.map(str::to_string);
        entry.entity_id = entity_id.map(str::to_string);
        entry.payload = payload.map(|p| p.to_string());

        if let Err(e) = self.db.insert_audit(&entry) {
            warn!(action, entity, error = %e, "audit write failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let recorder = AuditRecorder::new(&db);

        recorder.record(
            Some("coordinator@site-12"),
            "dispense",
            "lot",
            Some("lot-1"),
            Some(json!({"quantity": 3})),
        );

        let entries = db.list_recent_audit(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "dispense");
        assert_eq!(entries[0].entity_id, Some("lot-1".into()));
        assert_eq!(entries[0].payload, Some(r#"{"quantity":3}"#.into()));
    }

    #[test]
    fn test_failure_is_swallowed() {
        let db = Database::open_in_memory().unwrap();
        db.conn().execute("DROP TABLE audit_logs", []).unwrap();

        let recorder = AuditRecorder::new(&db);
        // Must not panic or surface the error
        recorder.record(None, "create", "patient", None, None);
    }
}
