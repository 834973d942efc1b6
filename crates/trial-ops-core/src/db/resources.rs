//! Schedulable resource database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Resource;

impl Database {
    /// Insert a new resource.
    pub fn insert_resource(&self, resource: &Resource) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO resources (id, name, category, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                resource.id,
                resource.name,
                resource.category,
                resource.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a resource by ID.
    pub fn get_resource(&self, id: &str) -> DbResult<Option<Resource>> {
        self.conn
            .query_row(
                "SELECT id, name, category, created_at FROM resources WHERE id = ?",
                [id],
                |row| {
                    Ok(Resource {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a resource by its exact display name.
    ///
    /// Names are unique; legacy free-text labels resolve through here.
    pub fn get_resource_by_name(&self, name: &str) -> DbResult<Option<Resource>> {
        self.conn
            .query_row(
                "SELECT id, name, category, created_at FROM resources WHERE name = ?",
                [name],
                |row| {
                    Ok(Resource {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all resources.
    pub fn list_resources(&self) -> DbResult<Vec<Resource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, created_at FROM resources ORDER BY name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Resource {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a resource.
    pub fn delete_resource(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM resources WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
