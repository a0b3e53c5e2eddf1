//! In-process note store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{NoteStore, UpsertOutcome};
use crate::error::{Error, Result};
use crate::note::{Note, Selector, TITLE_FIELD};

/// Notes kept in a `Vec`, in insertion order.
///
/// Upserts hold the write lock across the lookup and the write, so
/// concurrent saves of one title never produce duplicates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Map<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn has_title(document: &Map<String, Value>, title: &str) -> bool {
    document.get(TITLE_FIELD).and_then(Value::as_str) == Some(title)
}

#[async_trait]
impl NoteStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_titles(&self) -> Result<Vec<String>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter_map(|doc| doc.get(TITLE_FIELD).and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Note>> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|doc| has_title(doc, title))
            .map(|doc| {
                Note::from_document(doc.clone()).map_err(|e| Error::invalid_document(e.to_string()))
            })
            .transpose()
    }

    async fn upsert(&self, note: &Note) -> Result<UpsertOutcome> {
        let document = note.to_document();
        let mut documents = self.documents.write().await;

        match documents.iter().position(|doc| has_title(doc, &note.title)) {
            Some(index) => {
                documents[index] = document;
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                documents.push(document);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn delete(&self, selector: &Selector) -> Result<bool> {
        let mut documents = self.documents.write().await;
        match documents.iter().position(|doc| selector.matches(doc)) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
