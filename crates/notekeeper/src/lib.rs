//! `notekeeper` - a minimal note-taking service
//!
//! Clients list note titles, fetch a note by title, save (insert or replace)
//! a note, and delete notes, all over a small HTTP API backed by a
//! schemaless document store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod note;
pub mod notes;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{Note, Selector};
pub use notes::Notes;
pub use storage::{MemoryStore, NoteStore, SqliteStore, UpsertOutcome};
