//! Local note storage and the frame payload decoder.

pub mod json_store;
pub mod memory;
pub mod note;
pub mod payload;

pub use json_store::JsonNoteStore;
pub use memory::MemoryNoteStore;
pub use note::Note;
pub use payload::{FramePayload, PayloadError};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Note store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Note store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage port for notes. Implementations keep `last_modified` current and
/// return `all()` newest first.
pub trait NoteStore {
    fn create(&mut self, text: &str) -> Result<Note, StorageError>;

    /// Replaces the text and, when given, the saved index. Unknown ids are a
    /// no-op returning `Ok(None)`.
    fn update(
        &mut self,
        id: Uuid,
        text: &str,
        saved_index: Option<usize>,
    ) -> Result<Option<Note>, StorageError>;

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError>;

    fn get(&self, id: Uuid) -> Option<Note>;

    fn all(&self) -> Vec<Note>;

    fn count(&self) -> usize {
        self.all().len()
    }

    fn set_saved_index(&mut self, id: Uuid, index: usize) -> Result<(), StorageError> {
        if let Some(note) = self.get(id) {
            self.update(id, &note.text, Some(index))?;
        }
        Ok(())
    }

    /// Seeds the store with a single welcome note when it is empty.
    fn initialize(&mut self, welcome_text: &str) -> Result<(), StorageError> {
        if self.count() == 0 {
            self.create(welcome_text)?;
        }
        Ok(())
    }
}

fn newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

/// Current time, nudged past the newest stored timestamp so edits made within
/// one clock tick still order correctly.
fn next_timestamp<'a>(notes: impl IntoIterator<Item = &'a Note>) -> DateTime<Utc> {
    let now = Utc::now();
    match notes.into_iter().map(|n| n.last_modified).max() {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}
