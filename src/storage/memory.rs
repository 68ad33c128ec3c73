use uuid::Uuid;

use super::{newest_first, next_timestamp, Note, NoteStore, StorageError};

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Vec<Note>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }
}

impl NoteStore for MemoryNoteStore {
    fn create(&mut self, text: &str) -> Result<Note, StorageError> {
        let mut note = Note::new(text);
        note.last_modified = next_timestamp(&self.notes);
        self.notes.push(note.clone());
        Ok(note)
    }

    fn update(
        &mut self,
        id: Uuid,
        text: &str,
        saved_index: Option<usize>,
    ) -> Result<Option<Note>, StorageError> {
        let stamp = next_timestamp(&self.notes);
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };

        note.text = text.to_string();
        if let Some(index) = saved_index {
            note.saved_index = index;
        }
        note.last_modified = stamp;
        Ok(Some(note.clone()))
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        self.notes.retain(|n| n.id != id);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<Note> {
        self.notes.iter().find(|n| n.id == id).cloned()
    }

    fn all(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        newest_first(&mut notes);
        notes
    }

    fn count(&self) -> usize {
        self.notes.len()
    }
}
