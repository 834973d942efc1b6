//! Audit trail models.

use serde::{Deserialize, Serialize};

/// An append-only record of a mutating action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// Primary key (UUID)
    pub id: String,
    /// Who performed the action, when known
    pub actor: Option<String>,
    /// Verb (e.g., "create", "dispense", "cancel")
    pub action: String,
    /// Entity kind acted on (e.g., "appointment", "lot")
    pub entity: String,
    /// Id of the entity acted on
    pub entity_id: Option<String>,
    /// JSON detail payload
    pub payload: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl AuditEntry {
    /// Create a new audit entry for an action on an entity kind.
    pub fn new(action: &str, entity: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor: None,
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id: None,
            payload: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
