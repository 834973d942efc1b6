//! Dispense ledger database operations.
//!
//! Dispense rows are append-only; there is no update or delete.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::Dispense;

impl Database {
    /// Insert a new dispense record.
    pub fn insert_dispense(&self, dispense: &Dispense) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inventory_dispenses (id, patient_id, item_id, lot_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                dispense.id,
                dispense.patient_id,
                dispense.item_id,
                dispense.lot_id,
                dispense.quantity,
                dispense.created_at,
            ],
        )?;
        Ok(())
    }

    /// List dispenses for a patient, newest first.
    pub fn list_dispenses_for_patient(&self, patient_id: &str) -> DbResult<Vec<Dispense>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, item_id, lot_id, quantity, created_at
            FROM inventory_dispenses
            WHERE patient_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(Dispense {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                item_id: row.get(2)?,
                lot_id: row.get(3)?,
                quantity: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List dispenses drawn from a lot, oldest first.
    pub fn list_dispenses_for_lot(&self, lot_id: &str) -> DbResult<Vec<Dispense>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, item_id, lot_id, quantity, created_at
            FROM inventory_dispenses
            WHERE lot_id = ?
            ORDER BY created_at, rowid
            "#,
        )?;

        let rows = stmt.query_map([lot_id], |row| {
            Ok(Dispense {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                item_id: row.get(2)?,
                lot_id: row.get(3)?,
                quantity: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total units ever dispensed from a lot.
    ///
    /// Together with the lot's remaining quantity this reconstructs the
    /// lot's originally-created quantity.
    pub fn total_dispensed_for_lot(&self, lot_id: &str) -> DbResult<i64> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(quantity), 0) FROM inventory_dispenses WHERE lot_id = ?",
                [lot_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
