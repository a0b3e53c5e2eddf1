//! Document store backends for notes.
//!
//! [`NoteStore`] is the seam between the note adapter and whatever holds the
//! documents. Two implementations ship with the crate:
//! - [`SqliteStore`]: persistent, one JSON document per row
//! - [`MemoryStore`]: process-local, for tests and throwaway runs

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::note::{Note, Selector};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No note had the title; a new record was written.
    Inserted,
    /// The first note with the title was replaced wholesale.
    Replaced,
}

impl std::fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inserted => write!(f, "inserted"),
            Self::Replaced => write!(f, "replaced"),
        }
    }
}

/// A schemaless collection of note documents.
///
/// Implementations report an unreachable or uninitialized backend as
/// [`crate::Error::StoreUnavailable`]; callers decide whether that degrades
/// or fails.
#[async_trait]
pub trait NoteStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Titles of all stored notes, in store-native order.
    async fn list_titles(&self) -> Result<Vec<String>>;

    /// The first note whose `Title` equals `title`.
    async fn find_by_title(&self, title: &str) -> Result<Option<Note>>;

    /// Replace the first note with the same title, or insert a new one.
    ///
    /// The lookup and the write happen atomically with respect to other
    /// calls on the same store.
    async fn upsert(&self, note: &Note) -> Result<UpsertOutcome>;

    /// Delete the first note matching `selector`.
    ///
    /// Returns `false` when nothing matched.
    async fn delete(&self, selector: &Selector) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_outcome_display() {
        assert_eq!(UpsertOutcome::Inserted.to_string(), "inserted");
        assert_eq!(UpsertOutcome::Replaced.to_string(), "replaced");
    }
}
