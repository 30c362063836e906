//! Symbol store schema (C3, spec §4.3). One `schema_version` row controls
//! forward compatibility; `apply` is idempotent (`CREATE TABLE IF NOT
//! EXISTS`) so opening an existing cache file never fails on a fresh
//! process.

pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_SCHEMA_VERSION: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
)";

pub const CREATE_SYMBOLS: &str = "
CREATE TABLE IF NOT EXISTS symbols (
    id              TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,
    name            TEXT NOT NULL,
    qualified_name  TEXT NOT NULL,
    language         TEXT NOT NULL,
    file_path       TEXT NOT NULL,
    start_line      INTEGER NOT NULL,
    start_column    INTEGER NOT NULL,
    start_byte      INTEGER NOT NULL,
    end_byte        INTEGER NOT NULL,
    parent_id       TEXT,
    modifiers_json  TEXT NOT NULL DEFAULT '[]',
    signature_json  TEXT,
    declared_types_json TEXT,
    docblock_json   TEXT,
    indexed_at      TEXT NOT NULL
)";

pub const CREATE_REFERENCES: &str = "
CREATE TABLE IF NOT EXISTS refs (
    source_id   TEXT NOT NULL,
    target_id   TEXT,
    target_raw  TEXT,
    kind        TEXT NOT NULL,
    site_line   INTEGER NOT NULL,
    site_column INTEGER NOT NULL,
    context     TEXT,
    UNIQUE(source_id, target_id, kind, site_line, site_column)
)";

pub const CREATE_CONFIG_REFERENCES: &str = "
CREATE TABLE IF NOT EXISTS config_references (
    config_file_id TEXT NOT NULL,
    target_id       TEXT,
    target_raw      TEXT NOT NULL,
    kind            TEXT NOT NULL,
    key_path        TEXT NOT NULL,
    UNIQUE(config_file_id, key_path, target_raw, kind)
)";

pub const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_symbols_qualified_name ON symbols(qualified_name)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_language_qn ON symbols(language, qualified_name)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_parent_id ON symbols(parent_id)",
    "CREATE INDEX IF NOT EXISTS idx_symbols_file_path ON symbols(file_path)",
    "CREATE INDEX IF NOT EXISTS idx_refs_source_id ON refs(source_id)",
    "CREATE INDEX IF NOT EXISTS idx_refs_target_id ON refs(target_id)",
    "CREATE INDEX IF NOT EXISTS idx_refs_target_raw ON refs(target_raw)",
    "CREATE INDEX IF NOT EXISTS idx_config_refs_target_raw ON config_references(target_raw)",
];
