//! Basic inventory variant: item quantities grouped by study.
//!
//! A simplified parallel model kept for sites that track stock per study
//! without lot-level detail. No dispense ledger and no conservation
//! invariant applies here.

use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{Database, DbResult};

/// A denormalized basic-inventory listing row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasicInventoryRow {
    /// Inventory row id
    pub id: String,
    /// Item name
    pub item_name: String,
    /// Item description
    pub description: Option<String>,
    /// Study display name
    pub study_name: String,
    /// External study identifier
    pub study_id: String,
    /// Units on hand
    pub quantity: i64,
}

impl Database {
    /// Create a basic-inventory entry: a new item row, the study (reused if
    /// its external id is already known), and the linking inventory row.
    ///
    /// Returns the new inventory row id.
    pub fn create_basic_inventory(
        &self,
        item_name: &str,
        description: Option<&str>,
        study_name: &str,
        study_id: &str,
        quantity: i64,
    ) -> DbResult<String> {
        let tx = self.unchecked_transaction()?;

        let item_pk = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO items (id, name, description) VALUES (?1, ?2, ?3)",
            params![item_pk, item_name, description],
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO studies (id, study_name, study_id) VALUES (?1, ?2, ?3)",
            params![uuid::Uuid::new_v4().to_string(), study_name, study_id],
        )?;
        let study_pk: String = self.conn.query_row(
            "SELECT id FROM studies WHERE study_id = ?",
            [study_id],
            |row| row.get(0),
        )?;

        let inventory_pk = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO inventory (id, item_id, study_id, quantity) VALUES (?1, ?2, ?3, ?4)",
            params![inventory_pk, item_pk, study_pk, quantity],
        )?;

        tx.commit()?;
        Ok(inventory_pk)
    }

    /// List basic-inventory entries joined with their item and study,
    /// newest first.
    pub fn list_basic_inventory(&self) -> DbResult<Vec<BasicInventoryRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT inv.id,
                   i.name        AS item_name,
                   i.description AS description,
                   s.study_name  AS study_name,
                   s.study_id    AS study_id,
                   inv.quantity
            FROM inventory inv
            JOIN items   i ON i.id = inv.item_id
            JOIN studies s ON s.id = inv.study_id
            ORDER BY inv.rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(BasicInventoryRow {
                id: row.get(0)?,
                item_name: row.get(1)?,
                description: row.get(2)?,
                study_name: row.get(3)?,
                study_id: row.get(4)?,
                quantity: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
