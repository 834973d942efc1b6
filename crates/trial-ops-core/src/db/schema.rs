//! SQLite schema definition.

/// Complete database schema for trial-ops.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    dob TEXT,
    baseline_date TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_last_name ON patients(last_name);

-- ============================================================================
-- Scheduling Reference Data
-- ============================================================================

CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS visit_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    offset_days INTEGER NOT NULL DEFAULT 0,
    window_minus_days INTEGER NOT NULL DEFAULT 0,
    window_plus_days INTEGER NOT NULL DEFAULT 0,
    default_duration_minutes INTEGER NOT NULL DEFAULT 30,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    title TEXT NOT NULL,
    start_at TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
    resource_id TEXT REFERENCES resources(id),
    resource_label TEXT,
    visit_type_id TEXT REFERENCES visit_types(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_start ON appointments(start_at);
CREATE INDEX IF NOT EXISTS idx_appointments_resource ON appointments(resource_id);

-- ============================================================================
-- Inventory
-- ============================================================================

CREATE TABLE IF NOT EXISTS inventory_items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS inventory_lots (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL REFERENCES inventory_items(id),
    lot_code TEXT,
    quantity INTEGER NOT NULL CHECK (quantity >= 0),
    expires_on TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_lots_item ON inventory_lots(item_id);
CREATE INDEX IF NOT EXISTS idx_lots_exp ON inventory_lots(expires_on);

CREATE TABLE IF NOT EXISTS inventory_dispenses (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    item_id TEXT NOT NULL REFERENCES inventory_items(id),
    lot_id TEXT NOT NULL REFERENCES inventory_lots(id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_dispenses_item ON inventory_dispenses(item_id);
CREATE INDEX IF NOT EXISTS idx_dispenses_patient ON inventory_dispenses(patient_id);
CREATE INDEX IF NOT EXISTS idx_dispenses_lot ON inventory_dispenses(lot_id);

-- ============================================================================
-- Audit Logs (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS audit_logs (
    id TEXT PRIMARY KEY,
    actor TEXT,
    action TEXT NOT NULL,
    entity TEXT NOT NULL,
    entity_id TEXT,
    payload TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Basic Inventory Variant (item x study, no lot tracking)
-- ============================================================================

CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS studies (
    id TEXT PRIMARY KEY,
    study_name TEXT NOT NULL,
    study_id TEXT NOT NULL,
    UNIQUE(study_id)
);

CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    item_id TEXT NOT NULL REFERENCES items(id),
    study_id TEXT NOT NULL REFERENCES studies(id),
    quantity INTEGER NOT NULL DEFAULT 0
);
"#;
