//! `SQLite`-backed note store.
//!
//! Every note is stored as its JSON document alongside an indexed copy of
//! the title. The connection is opened lazily and re-attempted on the next
//! call after a failure, so a missing or unwritable database shows up as
//! [`Error::StoreUnavailable`] rather than a startup crash.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::migrations;
use super::{NoteStore, UpsertOutcome};
use crate::error::{Error, Result};
use crate::note::{Note, Selector};

/// Label used in place of a path for in-memory databases.
const IN_MEMORY_PATH: &str = ":memory:";

/// Note store persisted in a `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Lazily opened connection, shared by clones.
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Create a store for the database at `path` without opening it.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a store and open its database immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_connection(&path)?;
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(IN_MEMORY_PATH),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(IN_MEMORY_PATH),
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the database cannot be opened.
    pub async fn connect(&self) -> Result<()> {
        self.with_conn(|_| Ok(())).await
    }

    /// Run `op` against the connection on the blocking pool, opening the
    /// database first if needed.
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(|poisoned| {
                // The connection may be mid-transaction; drop it and reopen
                warn!("Note database lock poisoned, reopening connection");
                let mut guard = poisoned.into_inner();
                *guard = None;
                conn.clear_poison();
                guard
            });

            if guard.is_none() {
                let opened = open_connection(&path).map_err(|e| {
                    warn!("Cannot open note database at {}: {}", path.display(), e);
                    Error::store_unavailable(e.to_string())
                })?;
                *guard = Some(opened);
            }

            let Some(conn) = guard.as_mut() else {
                return Err(Error::internal("connection missing after open"));
            };
            op(conn)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

/// Open (creating if needed) the database file and bring its schema current.
fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    debug!("Opening database at {}", path.display());
    let conn = Connection::open(path).map_err(|source| Error::DatabaseOpen {
        path: path.to_path_buf(),
        source,
    })?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    migrations::initialize_schema(&conn)?;

    info!("Database opened successfully at {}", path.display());
    Ok(conn)
}

fn parse_document(raw: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(raw).map_err(|e| Error::invalid_document(e.to_string()))
}

/// Row id of the first note matching every field of `selector`.
fn find_first_match(conn: &Connection, selector: &Selector) -> Result<Option<i64>> {
    // A string Title narrows the scan through the index
    let mut stmt = conn.prepare(
        r"
        SELECT id, document FROM notes
        WHERE (?1 IS NULL OR title = ?1)
        ORDER BY id
        ",
    )?;
    let mut rows = stmt.query([selector.title()])?;

    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let raw: String = row.get(1)?;
        if selector.matches(&parse_document(&raw)?) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

#[async_trait]
impl NoteStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_titles(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT title FROM notes ORDER BY id")?;
            let titles = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(titles)
        })
        .await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Note>> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT document FROM notes WHERE title = ?1 ORDER BY id LIMIT 1",
                    [&title],
                    |row| row.get(0),
                )
                .optional()?;

            raw.map(|raw| {
                Note::from_document(parse_document(&raw)?)
                    .map_err(|e| Error::invalid_document(e.to_string()))
            })
            .transpose()
        })
        .await
    }

    async fn upsert(&self, note: &Note) -> Result<UpsertOutcome> {
        let title = note.title.clone();
        let document = serde_json::to_string(&note.to_document())?;

        let outcome = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let existing: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM notes WHERE title = ?1 ORDER BY id LIMIT 1",
                        [&title],
                        |row| row.get(0),
                    )
                    .optional()?;

                let now = Utc::now().to_rfc3339();
                let outcome = match existing {
                    Some(id) => {
                        tx.execute(
                            "UPDATE notes SET document = ?1, updated_at = ?2 WHERE id = ?3",
                            params![document, now, id],
                        )?;
                        UpsertOutcome::Replaced
                    }
                    None => {
                        tx.execute(
                            r"
                            INSERT INTO notes (title, document, created_at, updated_at)
                            VALUES (?1, ?2, ?3, ?3)
                            ",
                            params![title, document, now],
                        )?;
                        UpsertOutcome::Inserted
                    }
                };
                tx.commit()?;
                Ok(outcome)
            })
            .await?;

        debug!("Upsert of '{}' {}", note.title, outcome);
        Ok(outcome)
    }

    async fn delete(&self, selector: &Selector) -> Result<bool> {
        let selector = selector.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let target = find_first_match(&tx, &selector)?;
            if let Some(id) = target {
                tx.execute("DELETE FROM notes WHERE id = ?1", [id])?;
                debug!("Deleted note row {}", id);
            }
            tx.commit()?;
            Ok(target.is_some())
        })
        .await
    }
}
