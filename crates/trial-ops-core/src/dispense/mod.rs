//! Lot allocation and dispense engine.
//!
//! Moves stock from a lot to a patient as an immutable ledger entry. The
//! sufficiency check and the decrement are one conditional UPDATE, and the
//! decrement plus the ledger insert share one store transaction, so a lot
//! can never be driven negative by racing dispenses.

use thiserror::Error;
use tracing::debug;

use crate::db::{Database, DbError};
use crate::models::{Dispense, DispenseRequest};

/// Dispense errors.
#[derive(Error, Debug)]
pub enum DispenseError {
    #[error("Invalid dispense request: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Database error: {0}")]
    Store(#[from] DbError),
}

pub type DispenseResult<T> = Result<T, DispenseError>;

/// The dispense engine.
pub struct DispenseEngine<'a> {
    db: &'a Database,
}

impl<'a> DispenseEngine<'a> {
    /// Create a new dispense engine.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Dispense `quantity` units from a lot to a patient.
    ///
    /// Validates before touching the store, then atomically decrements the
    /// lot and appends the ledger entry. The lot must belong to the named
    /// item; mismatched pairs are rejected rather than silently recorded.
    pub fn dispense(&self, request: &DispenseRequest) -> DispenseResult<Dispense> {
        if request.quantity <= 0 {
            return Err(DispenseError::Validation(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        if request.patient_id.trim().is_empty()
            || request.item_id.trim().is_empty()
            || request.lot_id.trim().is_empty()
        {
            return Err(DispenseError::Validation(
                "patient_id, item_id and lot_id are required".into(),
            ));
        }

        let lot = self
            .db
            .get_lot(&request.lot_id)?
            .ok_or_else(|| DispenseError::NotFound(format!("lot {}", request.lot_id)))?;

        if lot.item_id != request.item_id {
            return Err(DispenseError::Validation(format!(
                "lot {} belongs to item {}, not item {}",
                lot.id, lot.item_id, request.item_id
            )));
        }

        if self.db.get_patient(&request.patient_id)?.is_none() {
            return Err(DispenseError::NotFound(format!(
                "patient {}",
                request.patient_id
            )));
        }

        let tx = self.db.unchecked_transaction()?;

        if !self.db.try_decrement_lot(&request.lot_id, request.quantity)? {
            // The conditional update said no; re-read for the error detail.
            let available = self
                .db
                .get_lot(&request.lot_id)?
                .map(|l| l.quantity)
                .unwrap_or(0);
            return Err(DispenseError::InsufficientStock {
                requested: request.quantity,
                available,
            });
        }

        let dispense = Dispense::new(
            request.patient_id.clone(),
            request.item_id.clone(),
            request.lot_id.clone(),
            request.quantity,
        );
        self.db.insert_dispense(&dispense)?;

        tx.commit().map_err(DbError::from)?;

        debug!(
            lot = %dispense.lot_id,
            patient = %dispense.patient_id,
            quantity = dispense.quantity,
            "dispense committed"
        );
        Ok(dispense)
    }
}
