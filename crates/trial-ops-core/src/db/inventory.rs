//! Inventory item and lot database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::{InventoryItem, InventoryLot};

impl Database {
    /// Insert a new inventory item.
    pub fn insert_item(&self, item: &InventoryItem) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inventory_items (id, name, category, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                item.id,
                item.name,
                item.category,
                item.description,
                item.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an inventory item by ID.
    pub fn get_item(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, category, description, created_at
                FROM inventory_items
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(InventoryItem {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                        description: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all inventory items.
    pub fn list_items(&self) -> DbResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, category, description, created_at
            FROM inventory_items
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(InventoryItem {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an inventory item.
    pub fn delete_item(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM inventory_items WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Insert a new lot.
    pub fn insert_lot(&self, lot: &InventoryLot) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inventory_lots (id, item_id, lot_code, quantity, expires_on, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                lot.id,
                lot.item_id,
                lot.lot_code,
                lot.quantity,
                lot.expires_on,
                lot.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a lot by ID.
    pub fn get_lot(&self, id: &str) -> DbResult<Option<InventoryLot>> {
        self.conn
            .query_row(
                r#"
                SELECT id, item_id, lot_code, quantity, expires_on, created_at
                FROM inventory_lots
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(InventoryLot {
                        id: row.get(0)?,
                        item_id: row.get(1)?,
                        lot_code: row.get(2)?,
                        quantity: row.get(3)?,
                        expires_on: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List lots belonging to an item, earliest expiry first, undated last.
    pub fn list_lots_for_item(&self, item_id: &str) -> DbResult<Vec<InventoryLot>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, item_id, lot_code, quantity, expires_on, created_at
            FROM inventory_lots
            WHERE item_id = ?
            ORDER BY expires_on IS NULL, expires_on, created_at
            "#,
        )?;

        let rows = stmt.query_map([item_id], |row| {
            Ok(InventoryLot {
                id: row.get(0)?,
                item_id: row.get(1)?,
                lot_code: row.get(2)?,
                quantity: row.get(3)?,
                expires_on: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Conditionally decrement a lot's quantity.
    ///
    /// The sufficiency check happens inside the UPDATE itself, so two racing
    /// decrements can never both pass against a stale read; the affected-row
    /// count is the authoritative answer. Returns false when the lot is
    /// missing or holds less than `quantity`.
    pub fn try_decrement_lot(&self, lot_id: &str, quantity: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE inventory_lots
            SET quantity = quantity - ?2
            WHERE id = ?1 AND quantity >= ?2
            "#,
            params![lot_id, quantity],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a lot.
    pub fn delete_lot(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM inventory_lots WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
