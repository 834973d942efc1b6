//! Scheduling models: resources, visit types, appointments.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A schedulable entity (room, device, chair).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Primary key (UUID)
    pub id: String,
    /// Unique display name; the legacy free-text appointment label is
    /// re-derived from this, never stored independently
    pub name: String,
    /// Grouping category (e.g., "room", "device")
    pub category: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Resource {
    /// Create a new resource with required fields.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            category: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A protocol visit template.
///
/// The window fields describe when the visit may be scheduled relative to
/// the patient's baseline date: `[baseline + offset - minus, baseline +
/// offset + plus]`, inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitType {
    /// Primary key (UUID)
    pub id: String,
    /// Template name (e.g., "Week 4 Follow-up")
    pub name: String,
    /// Days from baseline to the target visit date
    pub offset_days: i64,
    /// Allowed days before the target date
    pub window_minus_days: i64,
    /// Allowed days after the target date
    pub window_plus_days: i64,
    /// Default appointment duration when pre-filling
    pub default_duration_minutes: i64,
    /// Creation timestamp
    pub created_at: String,
}

impl VisitType {
    /// Create a new visit type with required fields.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            offset_days: 0,
            window_minus_days: 0,
            window_plus_days: 0,
            default_duration_minutes: 30,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A committed appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Primary key (UUID)
    pub id: String,
    /// Patient the appointment belongs to
    pub patient_id: String,
    /// Display title
    pub title: String,
    /// Start timestamp (RFC 3339 UTC)
    pub start_at: String,
    /// Duration in minutes, always positive
    pub duration_minutes: i64,
    /// Canonical resource reference; the conflict-check key
    pub resource_id: Option<String>,
    /// Denormalized resource name cache for display
    pub resource_label: Option<String>,
    /// Visit template the appointment was created from
    pub visit_type_id: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Appointment {
    /// Create a new appointment with required fields.
    pub fn new(patient_id: String, title: String, start_at: String, duration_minutes: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            title,
            start_at,
            duration_minutes,
            resource_id: None,
            resource_label: None,
            visit_type_id: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The half-open occupancy interval `[start, start + duration)`.
    ///
    /// Returns `None` when the stored start timestamp is unreadable.
    pub fn interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse_timestamp(&self.start_at)?;
        Some((start, start + Duration::minutes(self.duration_minutes)))
    }
}

/// A candidate appointment, as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    /// Patient the appointment is for (required)
    pub patient_id: String,
    /// Display title (required)
    pub title: String,
    /// Start timestamp, RFC 3339 or naive `YYYY-MM-DDTHH:MM:SS` taken as UTC
    pub start_at: String,
    /// Duration in minutes, must be positive
    pub duration_minutes: i64,
    /// Canonical resource reference
    pub resource_id: Option<String>,
    /// Legacy free-text resource name; resolved to a canonical id by the
    /// scheduler, never used directly for conflict checks
    pub resource_label: Option<String>,
    /// Visit template reference
    pub visit_type_id: Option<String>,
}

/// Parse an ISO-8601 timestamp on a total time order.
///
/// Accepts RFC 3339 with any offset, or a naive `YYYY-MM-DDTHH:MM:SS`
/// which is taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2026-03-01T09:00:00Z").unwrap();
        let offset = parse_timestamp("2026-03-01T10:00:00+01:00").unwrap();
        let naive = parse_timestamp("2026-03-01T09:00:00").unwrap();

        assert_eq!(rfc, offset);
        assert_eq!(rfc, naive);
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn test_appointment_interval() {
        let appt = Appointment::new(
            "patient-1".into(),
            "Screening".into(),
            "2026-03-01T09:00:00Z".into(),
            30,
        );
        let (start, end) = appt.interval().unwrap();
        assert_eq!(end - start, Duration::minutes(30));
    }

    #[test]
    fn test_appointment_interval_unreadable() {
        let appt = Appointment::new(
            "patient-1".into(),
            "Screening".into(),
            "whenever".into(),
            30,
        );
        assert!(appt.interval().is_none());
    }

    #[test]
    fn test_visit_type_defaults() {
        let vt = VisitType::new("Week 4".into());
        assert_eq!(vt.offset_days, 0);
        assert_eq!(vt.default_duration_minutes, 30);
    }
}
