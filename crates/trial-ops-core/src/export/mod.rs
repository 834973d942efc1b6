//! Read-only export projections.

mod inventory_report;

pub use inventory_report::*;
