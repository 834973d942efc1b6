//! Denormalized inventory report: item × lot join with stock alerts.
//!
//! A pure projection over the store, ordered by item name and then expiry
//! ascending with undated lots last.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};

/// Alert tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Lots at or below this quantity are flagged as low stock
    pub low_stock_threshold: i64,
    /// Lots expiring within this many days are flagged as expiring soon
    pub expiring_within_days: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            expiring_within_days: 14,
        }
    }
}

/// One item × lot row of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryReportRow {
    /// Owning item id
    pub item_id: String,
    /// Item name
    pub item_name: String,
    /// Item category
    pub item_category: Option<String>,
    /// Lot id
    pub lot_id: String,
    /// Manufacturer lot code
    pub lot_code: Option<String>,
    /// Units remaining
    pub quantity: i64,
    /// Expiry date (YYYY-MM-DD)
    pub expires_on: Option<String>,
}

impl InventoryReportRow {
    /// Parsed expiry date, if recorded and well-formed.
    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expires_on
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// A complete inventory report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    /// Export timestamp
    pub generated_at: String,
    /// Item × lot rows
    pub rows: Vec<InventoryReportRow>,
}

impl InventoryReport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("item_name,item_category,lot_code,quantity,expires_on\n");

        // Lines
        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(&row.item_name),
                row.item_category.as_deref().map(escape_csv).unwrap_or_default(),
                row.lot_code.as_deref().map(escape_csv).unwrap_or_default(),
                row.quantity,
                row.expires_on.as_deref().unwrap_or(""),
            ));
        }

        csv
    }
}

/// Inventory report exporter.
pub struct InventoryReportExporter<'a> {
    db: &'a Database,
    config: ReportConfig,
}

impl<'a> InventoryReportExporter<'a> {
    /// Create an exporter with default alert tunables.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: ReportConfig::default(),
        }
    }

    /// Create an exporter with explicit alert tunables.
    pub fn with_config(db: &'a Database, config: ReportConfig) -> Self {
        Self { db, config }
    }

    /// Export every item × lot row.
    pub fn export_all(&self) -> DbResult<InventoryReport> {
        Ok(InventoryReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            rows: self.query_rows("")?,
        })
    }

    /// Rows whose lot quantity is at or below the low-stock threshold.
    pub fn low_stock(&self) -> DbResult<Vec<InventoryReportRow>> {
        self.query_rows("WHERE l.quantity <= ?")
    }

    /// Rows whose lot expires within the configured window of `today`,
    /// including lots already past their expiry.
    pub fn expiring_soon(&self, today: NaiveDate) -> DbResult<Vec<InventoryReportRow>> {
        let cutoff = today + Duration::days(self.config.expiring_within_days);
        let rows = self.query_rows("")?;
        Ok(rows
            .into_iter()
            .filter(|r| matches!(r.expiry(), Some(expiry) if expiry <= cutoff))
            .collect())
    }

    fn query_rows(&self, filter: &str) -> DbResult<Vec<InventoryReportRow>> {
        let sql = format!(
            r#"
            SELECT i.id, i.name, i.category, l.id, l.lot_code, l.quantity, l.expires_on
            FROM inventory_items i
            JOIN inventory_lots l ON l.item_id = i.id
            {}
            ORDER BY i.name, l.expires_on IS NULL, l.expires_on
            "#,
            filter
        );
        let mut stmt = self.db.conn().prepare(&sql)?;

        let rows = if filter.is_empty() {
            stmt.query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map([self.config.low_stock_threshold], map_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryReportRow> {
    Ok(InventoryReportRow {
        item_id: row.get(0)?,
        item_name: row.get(1)?,
        item_category: row.get(2)?,
        lot_id: row.get(3)?,
        lot_code: row.get(4)?,
        quantity: row.get(5)?,
        expires_on: row.get(6)?,
    })
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
