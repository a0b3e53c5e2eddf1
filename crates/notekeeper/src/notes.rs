//! The note store adapter.
//!
//! [`Notes`] is what the request handlers talk to. It owns an injected
//! [`NoteStore`] and decides how store failures surface: reads degrade to
//! "nothing there", writes propagate the error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::note::{Note, Selector};
use crate::storage::{NoteStore, UpsertOutcome};

/// Note operations over a shared document store.
#[derive(Debug, Clone)]
pub struct Notes {
    store: Arc<dyn NoteStore>,
}

impl Notes {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn NoteStore> {
        &self.store
    }

    /// Titles of every stored note.
    ///
    /// Advisory: a failing store yields an empty list.
    pub async fn list_titles(&self) -> Vec<String> {
        match self.store.list_titles().await {
            Ok(titles) => titles,
            Err(e) => {
                warn!("Listing titles from {} store failed: {}", self.store.name(), e);
                Vec::new()
            }
        }
    }

    /// The first note titled `title`, if any.
    ///
    /// A failing store is treated as "not found".
    pub async fn find_by_title(&self, title: &str) -> Option<Note> {
        match self.store.find_by_title(title).await {
            Ok(note) => note,
            Err(e) => {
                warn!("Looking up '{}' in {} store failed: {}", title, self.store.name(), e);
                None
            }
        }
    }

    /// The note titled `title`, or the placeholder when there is none.
    pub async fn find_or_placeholder(&self, title: Option<&str>) -> Note {
        match title.filter(|t| !t.is_empty()) {
            Some(title) => self
                .find_by_title(title)
                .await
                .unwrap_or_else(Note::placeholder),
            None => Note::placeholder(),
        }
    }

    /// Insert `note`, or replace the note that already has its title.
    ///
    /// # Errors
    ///
    /// Returns the store's error; a failed write is never reported as saved.
    pub async fn upsert(&self, note: &Note) -> Result<UpsertOutcome> {
        let outcome = self.store.upsert(note).await?;
        info!("Saved note '{}' ({})", note.title, outcome);
        Ok(outcome)
    }

    /// Delete the first note matching `selector`.
    ///
    /// Deleting nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the delete could not run.
    pub async fn delete(&self, selector: &Selector) -> Result<bool> {
        let deleted = self.store.delete(selector).await?;
        if deleted {
            info!("Deleted note matching {:?}", selector.fields());
        } else {
            debug!("No note matched {:?}", selector.fields());
        }
        Ok(deleted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStore;

    /// A store whose backend can never be reached.
    #[derive(Debug, Default)]
    pub(crate) struct UnavailableStore;

    #[async_trait]
    impl NoteStore for UnavailableStore {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        async fn list_titles(&self) -> Result<Vec<String>> {
            Err(Error::store_unavailable("connection refused"))
        }

        async fn find_by_title(&self, _title: &str) -> Result<Option<Note>> {
            Err(Error::store_unavailable("connection refused"))
        }

        async fn upsert(&self, _note: &Note) -> Result<UpsertOutcome> {
            Err(Error::store_unavailable("connection refused"))
        }

        async fn delete(&self, _selector: &Selector) -> Result<bool> {
            Err(Error::store_unavailable("connection refused"))
        }
    }

    fn memory_notes() -> Notes {
        Notes::new(Arc::new(MemoryStore::new()))
    }

    fn unavailable_notes() -> Notes {
        Notes::new(Arc::new(UnavailableStore))
    }

    #[tokio::test]
    async fn test_round_trip() {
        let notes = memory_notes();
        notes.upsert(&Note::new("A", "x")).await.unwrap();

        let note = notes.find_or_placeholder(Some("A")).await;
        assert_eq!(note, Note::new("A", "x"));
    }

    #[tokio::test]
    async fn test_placeholder_without_title() {
        let notes = memory_notes();
        notes.upsert(&Note::new("A", "x")).await.unwrap();

        assert_eq!(notes.find_or_placeholder(None).await, Note::placeholder());
        assert_eq!(notes.find_or_placeholder(Some("")).await, Note::placeholder());
    }

    #[tokio::test]
    async fn test_placeholder_for_missing_title() {
        let notes = memory_notes();
        assert_eq!(
            notes.find_or_placeholder(Some("missing")).await,
            Note::placeholder()
        );
    }

    #[tokio::test]
    async fn test_placeholder_is_not_persisted() {
        let notes = memory_notes();
        notes.find_or_placeholder(Some("missing")).await;
        assert!(notes.list_titles().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let notes = memory_notes();
        let note = Note::new("A", "x");

        assert_eq!(notes.upsert(&note).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(notes.upsert(&note).await.unwrap(), UpsertOutcome::Replaced);
        assert_eq!(notes.list_titles().await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_placeholder() {
        let notes = memory_notes();
        notes.upsert(&Note::new("A", "x")).await.unwrap();

        assert!(notes.delete(&Selector::by_title("A")).await.unwrap());
        assert_eq!(
            notes.find_or_placeholder(Some("A")).await,
            Note::placeholder()
        );
    }

    #[tokio::test]
    async fn test_unavailable_reads_degrade() {
        let notes = unavailable_notes();

        assert!(notes.list_titles().await.is_empty());
        assert!(notes.find_by_title("A").await.is_none());
        assert_eq!(
            notes.find_or_placeholder(Some("A")).await,
            Note::placeholder()
        );
    }

    #[tokio::test]
    async fn test_unavailable_writes_fail() {
        let notes = unavailable_notes();

        let err = notes.upsert(&Note::new("A", "")).await.unwrap_err();
        assert!(err.is_store_unavailable());

        let err = notes.delete(&Selector::by_title("A")).await.unwrap_err();
        assert!(err.is_store_unavailable());
    }
}
