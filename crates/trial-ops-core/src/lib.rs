//! Trial-Ops Core Library
//!
//! Clinical-research site operations: patient registry, conflict-checked
//! appointment scheduling, inventory lot tracking with dispensing, stock
//! reports, and best-effort audit logging.
//!
//! # Architecture
//!
//! ```text
//!                      TrialOpsCore (service facade)
//!                               │
//!          ┌────────────────────┼────────────────────┐
//!          │                    │                    │
//!          ▼                    ▼                    ▼
//!      Scheduler          DispenseEngine      InventoryReport
//!   (overlap checker)    (lot allocation)       (projection)
//!          │                    │                    │
//!          └───────────┬────────┴──────────┬─────────┘
//!                      ▼                   │
//!              ┌──────────────┐            │
//!              │   Database   │◄───────────┘
//!              │   (SQLite)   │◄──── AuditRecorder (fire-and-forget)
//!              └──────────────┘
//! ```
//!
//! # Core Invariants
//!
//! - **No double-booking**: for a fixed patient or a fixed resource, no two
//!   appointments' half-open intervals `[start, start + duration)` overlap.
//!   The conflict scan and the insert share one store transaction.
//! - **Non-negative stock**: a lot's quantity never goes below zero. The
//!   sufficiency check is a conditional UPDATE whose affected-row count is
//!   authoritative, so racing dispenses cannot both pass a stale read.
//! - **Conservation**: a lot's created quantity always equals its remaining
//!   quantity plus the sum of the dispenses drawn from it.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: domain types (Patient, Appointment, InventoryLot, etc.)
//! - [`scheduler`]: overlap checking and appointment commits
//! - [`dispense`]: lot allocation and the dispense ledger
//! - [`export`]: inventory report projection (CSV/JSON, stock alerts)
//! - [`audit`]: best-effort audit recording

pub mod audit;
pub mod db;
pub mod dispense;
pub mod export;
pub mod models;
pub mod scheduler;

// Re-export commonly used types
pub use audit::AuditRecorder;
pub use db::{Database, DbError};
pub use dispense::{DispenseEngine, DispenseError};
pub use export::{InventoryReport, InventoryReportExporter, InventoryReportRow, ReportConfig};
pub use models::{
    Appointment, AppointmentRequest, AuditEntry, Dispense, DispenseRequest, InventoryItem,
    InventoryLot, Patient, Resource, VisitType,
};
pub use scheduler::{ScheduleError, Scheduler, VisitWindow};

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::json;

// =========================================================================
// Service Error Type
// =========================================================================

/// Unified error for the service facade.
///
/// Each variant corresponds to one client-visible failure category
/// (Validation → 400, Conflict → 409, NotFound → 404, InsufficientStock →
/// 400, Store/Internal → 500 in HTTP terms); no variant is ever folded
/// into another.
#[derive(Debug, thiserror::Error)]
pub enum TrialOpsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Database error: {0}")]
    Store(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ScheduleError> for TrialOpsError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::Validation(m) => TrialOpsError::Validation(m),
            conflict @ ScheduleError::Conflict { .. } => {
                TrialOpsError::Conflict(conflict.to_string())
            }
            ScheduleError::NotFound(m) => TrialOpsError::NotFound(m),
            ScheduleError::Store(e) => TrialOpsError::Store(e),
        }
    }
}

impl From<DispenseError> for TrialOpsError {
    fn from(e: DispenseError) -> Self {
        match e {
            DispenseError::Validation(m) => TrialOpsError::Validation(m),
            DispenseError::NotFound(m) => TrialOpsError::NotFound(m),
            DispenseError::InsufficientStock { requested, available } => {
                TrialOpsError::InsufficientStock { requested, available }
            }
            DispenseError::Store(e) => TrialOpsError::Store(e),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for TrialOpsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TrialOpsError::Internal(format!("Lock poisoned: {}", e))
    }
}

pub type TrialOpsResult<T> = Result<T, TrialOpsError>;

// =========================================================================
// Service Facade
// =========================================================================

/// Thread-safe service facade over the store and the engines.
///
/// All store access is serialized through one internal mutex; the engines
/// add their own transactional units on top, so every operation here is
/// atomic with respect to every other.
pub struct TrialOpsCore {
    db: Arc<Mutex<Database>>,
    actor: Option<String>,
}

impl TrialOpsCore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> TrialOpsResult<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    /// Create an in-memory service (for testing).
    pub fn open_in_memory() -> TrialOpsResult<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    /// Wrap an already-open database.
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            actor: None,
        }
    }

    /// Set the actor recorded on subsequent audit entries.
    pub fn set_default_actor(&mut self, actor: impl Into<String>) {
        self.actor = Some(actor.into());
    }

    fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn create_patient(
        &self,
        first_name: String,
        last_name: String,
        dob: Option<String>,
        baseline_date: Option<String>,
    ) -> TrialOpsResult<Patient> {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(TrialOpsError::Validation(
                "first_name and last_name are required".into(),
            ));
        }

        let db = self.db.lock()?;
        let mut patient = Patient::new(first_name, last_name);
        patient.dob = dob;
        patient.baseline_date = baseline_date;
        db.insert_patient(&patient)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "create",
            "patient",
            Some(&patient.id),
            Some(json!({"first_name": patient.first_name, "last_name": patient.last_name})),
        );
        Ok(patient)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> TrialOpsResult<Option<Patient>> {
        let db = self.db.lock()?;
        Ok(db.get_patient(id)?)
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> TrialOpsResult<bool> {
        let db = self.db.lock()?;
        let updated = db.update_patient(patient)?;
        if updated {
            AuditRecorder::new(&db).record(
                self.actor(),
                "update",
                "patient",
                Some(&patient.id),
                None,
            );
        }
        Ok(updated)
    }

    /// List all patients.
    pub fn list_patients(&self) -> TrialOpsResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(db.list_patients()?)
    }

    /// Search patients by last-name prefix.
    pub fn search_patients(&self, query: &str, limit: usize) -> TrialOpsResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(db.search_patients(query, limit)?)
    }

    /// Delete a patient with no remaining appointments or dispenses.
    pub fn delete_patient(&self, id: &str) -> TrialOpsResult<bool> {
        let db = self.db.lock()?;
        let deleted = db.delete_patient(id)?;
        if deleted {
            AuditRecorder::new(&db).record(self.actor(), "delete", "patient", Some(id), None);
        }
        Ok(deleted)
    }

    // =========================================================================
    // Resource & Visit Type Operations
    // =========================================================================

    /// Create a schedulable resource.
    pub fn create_resource(
        &self,
        name: String,
        category: Option<String>,
    ) -> TrialOpsResult<Resource> {
        if name.trim().is_empty() {
            return Err(TrialOpsError::Validation("name is required".into()));
        }

        let db = self.db.lock()?;
        let mut resource = Resource::new(name);
        resource.category = category;
        db.insert_resource(&resource)?;

        AuditRecorder::new(&db).record(self.actor(), "create", "resource", Some(&resource.id), None);
        Ok(resource)
    }

    /// List all resources.
    pub fn list_resources(&self) -> TrialOpsResult<Vec<Resource>> {
        let db = self.db.lock()?;
        Ok(db.list_resources()?)
    }

    /// Delete a resource not referenced by any appointment.
    pub fn delete_resource(&self, id: &str) -> TrialOpsResult<bool> {
        let db = self.db.lock()?;
        let deleted = db.delete_resource(id)?;
        if deleted {
            AuditRecorder::new(&db).record(self.actor(), "delete", "resource", Some(id), None);
        }
        Ok(deleted)
    }

    /// Create a visit type template.
    pub fn create_visit_type(
        &self,
        name: String,
        offset_days: i64,
        window_minus_days: i64,
        window_plus_days: i64,
        default_duration_minutes: i64,
    ) -> TrialOpsResult<VisitType> {
        if name.trim().is_empty() {
            return Err(TrialOpsError::Validation("name is required".into()));
        }
        if default_duration_minutes <= 0 {
            return Err(TrialOpsError::Validation(
                "default_duration_minutes must be positive".into(),
            ));
        }

        let db = self.db.lock()?;
        let mut visit_type = VisitType::new(name);
        visit_type.offset_days = offset_days;
        visit_type.window_minus_days = window_minus_days;
        visit_type.window_plus_days = window_plus_days;
        visit_type.default_duration_minutes = default_duration_minutes;
        db.insert_visit_type(&visit_type)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "create",
            "visit_type",
            Some(&visit_type.id),
            None,
        );
        Ok(visit_type)
    }

    /// List all visit types.
    pub fn list_visit_types(&self) -> TrialOpsResult<Vec<VisitType>> {
        let db = self.db.lock()?;
        Ok(db.list_visit_types()?)
    }

    // =========================================================================
    // Scheduling Operations
    // =========================================================================

    /// Schedule an appointment, rejecting any double-booking.
    pub fn schedule_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> TrialOpsResult<Appointment> {
        let db = self.db.lock()?;
        let appointment = Scheduler::new(&db).schedule(request)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "create",
            "appointment",
            Some(&appointment.id),
            Some(json!({
                "patient_id": appointment.patient_id,
                "start_at": appointment.start_at,
                "duration_minutes": appointment.duration_minutes,
            })),
        );
        Ok(appointment)
    }

    /// Move or edit an existing appointment, re-running the conflict check.
    pub fn reschedule_appointment(
        &self,
        id: &str,
        request: &AppointmentRequest,
    ) -> TrialOpsResult<Appointment> {
        let db = self.db.lock()?;
        let appointment = Scheduler::new(&db).reschedule(id, request)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "update",
            "appointment",
            Some(&appointment.id),
            Some(json!({"start_at": appointment.start_at})),
        );
        Ok(appointment)
    }

    /// Cancel an appointment.
    pub fn cancel_appointment(&self, id: &str) -> TrialOpsResult<bool> {
        let db = self.db.lock()?;
        let deleted = db.delete_appointment(id)?;
        if deleted {
            AuditRecorder::new(&db).record(self.actor(), "delete", "appointment", Some(id), None);
        }
        Ok(deleted)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> TrialOpsResult<Option<Appointment>> {
        let db = self.db.lock()?;
        Ok(db.get_appointment(id)?)
    }

    /// List a patient's appointments, soonest first.
    pub fn list_appointments_for_patient(
        &self,
        patient_id: &str,
    ) -> TrialOpsResult<Vec<Appointment>> {
        let db = self.db.lock()?;
        Ok(db.list_appointments_for_patient(patient_id)?)
    }

    /// List appointments starting in `[from, to)` (RFC 3339 UTC bounds).
    pub fn list_appointments_between(
        &self,
        from: &str,
        to: &str,
    ) -> TrialOpsResult<Vec<Appointment>> {
        let db = self.db.lock()?;
        Ok(db.list_appointments_between(from, to)?)
    }

    // =========================================================================
    // Inventory Operations
    // =========================================================================

    /// Create an inventory item.
    pub fn create_inventory_item(
        &self,
        name: String,
        category: Option<String>,
        description: Option<String>,
    ) -> TrialOpsResult<InventoryItem> {
        if name.trim().is_empty() {
            return Err(TrialOpsError::Validation("name is required".into()));
        }

        let db = self.db.lock()?;
        let mut item = InventoryItem::new(name);
        item.category = category;
        item.description = description;
        db.insert_item(&item)?;

        AuditRecorder::new(&db).record(self.actor(), "create", "item", Some(&item.id), None);
        Ok(item)
    }

    /// List all inventory items.
    pub fn list_inventory_items(&self) -> TrialOpsResult<Vec<InventoryItem>> {
        let db = self.db.lock()?;
        Ok(db.list_items()?)
    }

    /// Create a lot under an item. Stock only ever enters the system here.
    pub fn create_inventory_lot(
        &self,
        item_id: &str,
        lot_code: Option<String>,
        quantity: i64,
        expires_on: Option<String>,
    ) -> TrialOpsResult<InventoryLot> {
        if quantity < 0 {
            return Err(TrialOpsError::Validation(format!(
                "quantity must be non-negative, got {}",
                quantity
            )));
        }

        let db = self.db.lock()?;
        if db.get_item(item_id)?.is_none() {
            return Err(TrialOpsError::NotFound(format!("item {}", item_id)));
        }

        let mut lot = InventoryLot::new(item_id.to_string(), quantity);
        lot.lot_code = lot_code;
        lot.expires_on = expires_on;
        db.insert_lot(&lot)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "create",
            "lot",
            Some(&lot.id),
            Some(json!({"item_id": lot.item_id, "quantity": lot.quantity})),
        );
        Ok(lot)
    }

    /// Get a lot by ID.
    pub fn get_inventory_lot(&self, id: &str) -> TrialOpsResult<Option<InventoryLot>> {
        let db = self.db.lock()?;
        Ok(db.get_lot(id)?)
    }

    /// List an item's lots, earliest expiry first.
    pub fn list_lots_for_item(&self, item_id: &str) -> TrialOpsResult<Vec<InventoryLot>> {
        let db = self.db.lock()?;
        Ok(db.list_lots_for_item(item_id)?)
    }

    /// Dispense stock from a lot to a patient.
    pub fn dispense(&self, request: &DispenseRequest) -> TrialOpsResult<Dispense> {
        let db = self.db.lock()?;
        let dispense = DispenseEngine::new(&db).dispense(request)?;

        AuditRecorder::new(&db).record(
            self.actor(),
            "dispense",
            "lot",
            Some(&dispense.lot_id),
            Some(json!({
                "patient_id": dispense.patient_id,
                "item_id": dispense.item_id,
                "quantity": dispense.quantity,
            })),
        );
        Ok(dispense)
    }

    /// List a patient's dispense history, newest first.
    pub fn list_dispenses_for_patient(&self, patient_id: &str) -> TrialOpsResult<Vec<Dispense>> {
        let db = self.db.lock()?;
        Ok(db.list_dispenses_for_patient(patient_id)?)
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Full item × lot inventory report.
    pub fn inventory_report(&self) -> TrialOpsResult<InventoryReport> {
        let db = self.db.lock()?;
        Ok(InventoryReportExporter::new(&db).export_all()?)
    }

    /// Inventory report as CSV.
    pub fn inventory_report_csv(&self) -> TrialOpsResult<String> {
        Ok(self.inventory_report()?.to_csv())
    }

    /// Lots at or below the low-stock threshold.
    pub fn low_stock_alerts(&self) -> TrialOpsResult<Vec<InventoryReportRow>> {
        let db = self.db.lock()?;
        Ok(InventoryReportExporter::new(&db).low_stock()?)
    }

    /// Lots expiring within the alert window of today.
    pub fn expiring_soon_alerts(&self) -> TrialOpsResult<Vec<InventoryReportRow>> {
        let db = self.db.lock()?;
        let today: NaiveDate = chrono::Utc::now().date_naive();
        Ok(InventoryReportExporter::new(&db).expiring_soon(today)?)
    }

    // =========================================================================
    // Audit Operations
    // =========================================================================

    /// Most recent audit entries, newest first.
    pub fn recent_audit(&self, limit: usize) -> TrialOpsResult<Vec<AuditEntry>> {
        let db = self.db.lock()?;
        Ok(db.list_recent_audit(limit)?)
    }

    // =========================================================================
    // Basic Inventory Operations
    // =========================================================================

    /// Create a basic-inventory entry (item × study, no lot tracking).
    pub fn create_basic_inventory(
        &self,
        item_name: &str,
        description: Option<&str>,
        study_name: &str,
        study_id: &str,
        quantity: i64,
    ) -> TrialOpsResult<String> {
        if item_name.trim().is_empty() || study_name.trim().is_empty() || study_id.trim().is_empty()
        {
            return Err(TrialOpsError::Validation(
                "item_name, study_name and study_id are required".into(),
            ));
        }

        let db = self.db.lock()?;
        let id = db.create_basic_inventory(item_name, description, study_name, study_id, quantity)?;

        AuditRecorder::new(&db).record(self.actor(), "create", "basic_inventory", Some(&id), None);
        Ok(id)
    }

    /// List basic-inventory entries, newest first.
    pub fn list_basic_inventory(&self) -> TrialOpsResult<Vec<db::BasicInventoryRow>> {
        let db = self.db.lock()?;
        Ok(db.list_basic_inventory()?)
    }
}
