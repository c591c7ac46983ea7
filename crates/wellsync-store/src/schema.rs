//! Database schema SQL.

/// Core tables: assets, faults, fault_embeddings.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL CHECK (kind IN ('well', 'transformer')),
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Operational',
    fault_details_json TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faults (
    fault_id TEXT PRIMARY KEY,
    well_id TEXT,
    transformer_id TEXT,
    part_id TEXT NOT NULL,
    fault_type TEXT NOT NULL,
    status TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    description TEXT,
    part_specifications_json TEXT
);

CREATE INDEX IF NOT EXISTS idx_faults_well_id ON faults(well_id);
CREATE INDEX IF NOT EXISTS idx_faults_transformer_id ON faults(transformer_id);
CREATE INDEX IF NOT EXISTS idx_faults_timestamp ON faults(timestamp);

CREATE TABLE IF NOT EXISTS fault_embeddings (
    fault_id TEXT PRIMARY KEY REFERENCES faults(fault_id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dimension INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
"#;
