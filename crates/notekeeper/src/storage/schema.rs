//! `SQLite` schema definitions for notekeeper.
//!
//! Each note is one row: the full JSON document plus a copy of its title
//! for lookups. Titles are indexed but not unique.

/// SQL statement to create the notes table.
pub const CREATE_NOTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    document TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on title for lookups.
pub const CREATE_TITLE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_notes_title ON notes(title)
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
    CREATE_NOTES_TABLE,
    CREATE_TITLE_INDEX,
    CREATE_METADATA_TABLE,
];
