//! Patient registry models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered study participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Primary key (UUID)
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub dob: Option<String>,
    /// Study baseline date anchoring protocol visit windows (YYYY-MM-DD)
    pub baseline_date: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(first_name: String, last_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            dob: None,
            baseline_date: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Display name, family name last.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Parsed baseline date, if one is recorded and well-formed.
    pub fn baseline(&self) -> Option<NaiveDate> {
        self.baseline_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}
