//! `SQLite` schema definitions for the visitor counter.
//!
//! Both tables are keyed by the visitor's IP address so that a returning
//! visitor never counts twice and an opt-out survives reconnects.

/// SQL statement to create the visitors table.
pub const CREATE_VISITORS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS visitors (
    ip TEXT PRIMARY KEY,
    first_seen INTEGER NOT NULL
)
";

/// SQL statement to create the opt-out table.
pub const CREATE_OPT_OUT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS opt_out (
    ip TEXT PRIMARY KEY,
    opted_out_at INTEGER NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_VISITORS_TABLE,
    CREATE_OPT_OUT_TABLE,
    CREATE_METADATA_TABLE,
];

/// Insert a visitor unless already present. Binds `?1` = ip.
pub const INSERT_VISITOR: &str = r"
INSERT OR IGNORE INTO visitors (ip, first_seen)
VALUES (?1, strftime('%s','now'))
";

/// Record an opt-out unless already present. Binds `?1` = ip.
pub const INSERT_OPT_OUT: &str = r"
INSERT OR IGNORE INTO opt_out (ip, opted_out_at)
VALUES (?1, strftime('%s','now'))
";
