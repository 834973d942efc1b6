//! Appointment scheduling engine.
//!
//! Pipeline: validate → resolve references → conflict scan → insert, with
//! the scan and the insert sharing one store transaction so concurrent
//! callers cannot both pass the check and both commit.

mod window;

pub use window::*;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{Database, DbError};
use crate::models::{parse_timestamp, Appointment, AppointmentRequest, Resource};

/// Scheduling errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid appointment request: {0}")]
    Validation(String),

    #[error("Conflicts with appointment {existing_id} starting {existing_start} for {existing_duration_minutes} min")]
    Conflict {
        existing_id: String,
        existing_start: String,
        existing_duration_minutes: i64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Store(#[from] DbError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Half-open interval intersection: `[a0, a1)` and `[b0, b1)` overlap iff
/// `a0 < b1 && b0 < a1`. Touching endpoints do not overlap.
pub fn intervals_overlap(
    a0: DateTime<Utc>,
    a1: DateTime<Utc>,
    b0: DateTime<Utc>,
    b1: DateTime<Utc>,
) -> bool {
    a0 < b1 && b0 < a1
}

/// The overlap checker: decides whether a candidate appointment may be
/// committed and performs the commit when it may.
pub struct Scheduler<'a> {
    db: &'a Database,
}

impl<'a> Scheduler<'a> {
    /// Create a new scheduler.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Validate a candidate appointment and insert it when no appointment
    /// sharing its patient or its resource overlaps the candidate's
    /// half-open interval.
    pub fn schedule(&self, request: &AppointmentRequest) -> ScheduleResult<Appointment> {
        self.commit(request, None)
    }

    /// Re-validate and move an existing appointment, ignoring its own row
    /// during the conflict scan.
    pub fn reschedule(
        &self,
        appointment_id: &str,
        request: &AppointmentRequest,
    ) -> ScheduleResult<Appointment> {
        let existing = self
            .db
            .get_appointment(appointment_id)?
            .ok_or_else(|| ScheduleError::NotFound(format!("appointment {}", appointment_id)))?;
        self.commit(request, Some(&existing))
    }

    fn commit(
        &self,
        request: &AppointmentRequest,
        replacing: Option<&Appointment>,
    ) -> ScheduleResult<Appointment> {
        let (start, end) = validate_request(request)?;

        // An appointment for a patient the registry does not know is a bad
        // request, not a missing sub-resource.
        let patient = self.db.get_patient(&request.patient_id)?.ok_or_else(|| {
            ScheduleError::Validation(format!(
                "patient {} does not exist",
                request.patient_id
            ))
        })?;

        let resource = self.resolve_resource(request)?;

        if let Some(visit_type_id) = non_empty(&request.visit_type_id) {
            let visit_type = self
                .db
                .get_visit_type(visit_type_id)?
                .ok_or_else(|| ScheduleError::NotFound(format!("visit type {}", visit_type_id)))?;

            // Window validation stays advisory: out-of-window visits are
            // allowed but flagged.
            if let Some(baseline) = patient.baseline() {
                let window = VisitWindow::for_visit(baseline, &visit_type);
                if !window.contains(start.date_naive()) {
                    warn!(
                        patient = %patient.id,
                        visit_type = %visit_type.name,
                        start = %request.start_at,
                        earliest = %window.earliest,
                        latest = %window.latest,
                        "appointment start outside protocol window"
                    );
                }
            }
        }

        let tx = self.db.unchecked_transaction()?;

        let candidates = self.db.list_conflict_candidates(
            &request.patient_id,
            resource.as_ref().map(|r| r.id.as_str()),
            replacing.map(|a| a.id.as_str()),
        )?;

        for existing in &candidates {
            let (b0, b1) = existing.interval().ok_or_else(|| {
                ScheduleError::Store(DbError::Constraint(format!(
                    "appointment {} has an unreadable start_at",
                    existing.id
                )))
            })?;
            if intervals_overlap(start, end, b0, b1) {
                debug!(
                    candidate_start = %request.start_at,
                    existing = %existing.id,
                    "overlap detected, rejecting"
                );
                return Err(ScheduleError::Conflict {
                    existing_id: existing.id.clone(),
                    existing_start: existing.start_at.clone(),
                    existing_duration_minutes: existing.duration_minutes,
                });
            }
        }

        // Timestamps are stored re-serialized so lexical order on the
        // column matches chronological order regardless of input format.
        let mut appointment = Appointment::new(
            request.patient_id.clone(),
            request.title.trim().to_string(),
            start.to_rfc3339(),
            request.duration_minutes,
        );
        appointment.resource_id = resource.as_ref().map(|r| r.id.clone());
        appointment.resource_label = resource.as_ref().map(|r| r.name.clone());
        appointment.visit_type_id = non_empty(&request.visit_type_id).map(str::to_string);

        match replacing {
            Some(existing) => {
                appointment.id = existing.id.clone();
                appointment.created_at = existing.created_at.clone();
                self.db.update_appointment(&appointment)?;
            }
            None => {
                self.db.insert_appointment(&appointment)?;
            }
        }

        tx.commit().map_err(DbError::from)?;

        Ok(appointment)
    }

    /// Resolve the candidate's resource to its canonical row.
    ///
    /// An explicit id wins over a legacy free-text label; labels resolve by
    /// exact name. The conflict scan only ever keys on the canonical id.
    fn resolve_resource(&self, request: &AppointmentRequest) -> ScheduleResult<Option<Resource>> {
        if let Some(id) = non_empty(&request.resource_id) {
            return self
                .db
                .get_resource(id)?
                .ok_or_else(|| ScheduleError::NotFound(format!("resource {}", id)))
                .map(Some);
        }
        if let Some(label) = non_empty(&request.resource_label) {
            return self
                .db
                .get_resource_by_name(label)?
                .ok_or_else(|| ScheduleError::NotFound(format!("resource named {:?}", label)))
                .map(Some);
        }
        Ok(None)
    }
}

fn validate_request(
    request: &AppointmentRequest,
) -> ScheduleResult<(DateTime<Utc>, DateTime<Utc>)> {
    if request.patient_id.trim().is_empty() {
        return Err(ScheduleError::Validation("patient_id is required".into()));
    }
    if request.title.trim().is_empty() {
        return Err(ScheduleError::Validation("title is required".into()));
    }
    if request.duration_minutes <= 0 {
        return Err(ScheduleError::Validation(format!(
            "duration_minutes must be positive, got {}",
            request.duration_minutes
        )));
    }
    let start = parse_timestamp(&request.start_at).ok_or_else(|| {
        ScheduleError::Validation(format!("start_at {:?} is not a valid timestamp", request.start_at))
    })?;
    Ok((start, start + chrono::Duration::minutes(request.duration_minutes)))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn ts(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    fn setup_db() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ada".into(), "Osei".into());
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    fn request(patient_id: &str, start_at: &str, duration_minutes: i64) -> AppointmentRequest {
        AppointmentRequest {
            patient_id: patient_id.to_string(),
            title: "Screening".into(),
            start_at: start_at.to_string(),
            duration_minutes,
            ..Default::default()
        }
    }

    #[test]
    fn test_intervals_overlap_basic() {
        // Plain intersection
        assert!(intervals_overlap(
            ts("2026-03-01T09:00:00Z"),
            ts("2026-03-01T09:30:00Z"),
            ts("2026-03-01T09:29:00Z"),
            ts("2026-03-01T09:45:00Z"),
        ));
        // Containment
        assert!(intervals_overlap(
            ts("2026-03-01T09:00:00Z"),
            ts("2026-03-01T10:00:00Z"),
            ts("2026-03-01T09:15:00Z"),
            ts("2026-03-01T09:30:00Z"),
        ));
        // Disjoint
        assert!(!intervals_overlap(
            ts("2026-03-01T09:00:00Z"),
            ts("2026-03-01T09:30:00Z"),
            ts("2026-03-01T10:00:00Z"),
            ts("2026-03-01T10:30:00Z"),
        ));
    }

    #[test]
    fn test_intervals_touching_do_not_overlap() {
        assert!(!intervals_overlap(
            ts("2026-03-01T09:00:00Z"),
            ts("2026-03-01T09:30:00Z"),
            ts("2026-03-01T09:30:00Z"),
            ts("2026-03-01T10:00:00Z"),
        ));
    }

    #[test]
    fn test_zero_width_interval_overlaps_nothing() {
        let t = ts("2026-03-01T09:15:00Z");
        assert!(!intervals_overlap(
            t,
            t,
            ts("2026-03-01T09:00:00Z"),
            ts("2026-03-01T09:30:00Z"),
        ));
    }

    #[test]
    fn test_validation_errors() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        let result = scheduler.schedule(&request("", "2026-03-01T09:00:00Z", 30));
        assert!(matches!(result, Err(ScheduleError::Validation(_))));

        let mut untitled = request(&patient.id, "2026-03-01T09:00:00Z", 30);
        untitled.title = "  ".into();
        assert!(matches!(
            scheduler.schedule(&untitled),
            Err(ScheduleError::Validation(_))
        ));

        let result = scheduler.schedule(&request(&patient.id, "2026-03-01T09:00:00Z", 0));
        assert!(matches!(result, Err(ScheduleError::Validation(_))));

        let result = scheduler.schedule(&request(&patient.id, "tomorrow-ish", 30));
        assert!(matches!(result, Err(ScheduleError::Validation(_))));
    }

    #[test]
    fn test_unknown_patient_rejected_as_validation() {
        let (db, _patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        let result = scheduler.schedule(&request("no-such-patient", "2026-03-01T09:00:00Z", 30));
        assert!(matches!(result, Err(ScheduleError::Validation(_))));
    }

    #[test]
    fn test_schedule_then_conflict() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        scheduler
            .schedule(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
            .unwrap();

        let result = scheduler.schedule(&request(&patient.id, "2026-03-01T09:29:00Z", 16));
        assert!(matches!(result, Err(ScheduleError::Conflict { .. })));

        // Nothing extra was committed
        assert_eq!(db.list_appointments_for_patient(&patient.id).unwrap().len(), 1);
    }

    #[test]
    fn test_back_to_back_allowed() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        scheduler
            .schedule(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
            .unwrap();
        scheduler
            .schedule(&request(&patient.id, "2026-03-01T09:30:00Z", 30))
            .unwrap();

        assert_eq!(db.list_appointments_for_patient(&patient.id).unwrap().len(), 2);
    }

    #[test]
    fn test_resource_label_resolves_to_canonical_id() {
        let (db, patient) = setup_db();
        let other = Patient::new("Kwame".into(), "Mensah".into());
        db.insert_patient(&other).unwrap();

        let room = crate::models::Resource::new("Room A".into());
        db.insert_resource(&room).unwrap();

        let scheduler = Scheduler::new(&db);

        let mut first = request(&patient.id, "2026-03-01T09:00:00Z", 30);
        first.resource_label = Some("Room A".into());
        let committed = scheduler.schedule(&first).unwrap();
        assert_eq!(committed.resource_id, Some(room.id.clone()));
        assert_eq!(committed.resource_label, Some("Room A".into()));

        // A different patient in the same room at the same time conflicts
        let mut second = request(&other.id, "2026-03-01T09:15:00Z", 30);
        second.resource_id = Some(room.id.clone());
        assert!(matches!(
            scheduler.schedule(&second),
            Err(ScheduleError::Conflict { .. })
        ));
    }

    #[test]
    fn test_unknown_resource_label_rejected() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        let mut req = request(&patient.id, "2026-03-01T09:00:00Z", 30);
        req.resource_label = Some("Room Z".into());
        assert!(matches!(
            scheduler.schedule(&req),
            Err(ScheduleError::NotFound(_))
        ));
    }

    #[test]
    fn test_no_resource_never_conflicts_on_resource_clause() {
        let (db, patient) = setup_db();
        let other = Patient::new("Kwame".into(), "Mensah".into());
        db.insert_patient(&other).unwrap();

        let scheduler = Scheduler::new(&db);

        scheduler
            .schedule(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
            .unwrap();
        // Different patient, overlapping time, neither has a resource
        scheduler
            .schedule(&request(&other.id, "2026-03-01T09:00:00Z", 30))
            .unwrap();
    }

    #[test]
    fn test_reschedule_excludes_own_row() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        let appt = scheduler
            .schedule(&request(&patient.id, "2026-03-01T09:00:00Z", 30))
            .unwrap();

        // Moving within its own original slot is fine
        let moved = scheduler
            .reschedule(&appt.id, &request(&patient.id, "2026-03-01T09:10:00Z", 30))
            .unwrap();
        assert_eq!(moved.id, appt.id);

        assert_eq!(db.list_appointments_for_patient(&patient.id).unwrap().len(), 1);
    }

    #[test]
    fn test_reschedule_missing_appointment() {
        let (db, patient) = setup_db();
        let scheduler = Scheduler::new(&db);

        let result =
            scheduler.reschedule("no-such-id", &request(&patient.id, "2026-03-01T09:00:00Z", 30));
        assert!(matches!(result, Err(ScheduleError::NotFound(_))));
    }
}
