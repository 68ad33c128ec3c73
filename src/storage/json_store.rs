use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use super::{newest_first, next_timestamp, Note, NoteStore, StorageError};

/// Notes kept as a JSON array in a single file. Every mutation rewrites the
/// file through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonNoteStore {
    path: PathBuf,
    notes: Vec<Note>,
}

impl JsonNoteStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let notes = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(io_error(&path, source)),
        };

        info!(path = %path.display(), notes = notes.len(), "opened note store");
        Ok(Self { path, notes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `notes` and only then makes them the store's contents, so a
    /// failed write leaves the store as it was.
    fn commit(&mut self, notes: Vec<Note>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&notes)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;

        debug!(path = %self.path.display(), notes = notes.len(), "saved notes");
        self.notes = notes;
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl NoteStore for JsonNoteStore {
    fn create(&mut self, text: &str) -> Result<Note, StorageError> {
        let mut note = Note::new(text);
        note.last_modified = next_timestamp(&self.notes);
        let mut notes = self.notes.clone();
        notes.push(note.clone());
        self.commit(notes)?;
        Ok(note)
    }

    fn update(
        &mut self,
        id: Uuid,
        text: &str,
        saved_index: Option<usize>,
    ) -> Result<Option<Note>, StorageError> {
        let stamp = next_timestamp(&self.notes);
        let mut notes = self.notes.clone();
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };

        note.text = text.to_string();
        if let Some(index) = saved_index {
            note.saved_index = index;
        }
        note.last_modified = stamp;
        let updated = note.clone();

        self.commit(notes)?;
        Ok(Some(updated))
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        if !self.notes.iter().any(|n| n.id == id) {
            return Ok(());
        }
        let notes = self.notes.iter().filter(|n| n.id != id).cloned().collect();
        self.commit(notes)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("glance-test-{}", Uuid::new_v4()))
            .join("notes.json")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let path = temp_store_path();
        let store = JsonNoteStore::open(&path).unwrap();
        assert_eq!(store.count(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_notes_survive_reopen() {
        let path = temp_store_path();
        let id = {
            let mut store = JsonNoteStore::open(&path).unwrap();
            let note = store.create("persist me").unwrap();
            store.set_saved_index(note.id, 1).unwrap();
            note.id
        };

        let store = JsonNoteStore::open(&path).unwrap();
        let note = store.get(id).unwrap();
        assert_eq!(note.text, "persist me");
        assert_eq!(note.saved_index, 1);
        assert!(!path.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_delete_persists() {
        let path = temp_store_path();
        let mut store = JsonNoteStore::open(&path).unwrap();
        let keep = store.create("keep").unwrap();
        let gone = store.create("gone").unwrap();
        store.delete(gone.id).unwrap();

        let reopened = JsonNoteStore::open(&path).unwrap();
        assert_eq!(reopened.count(), 1);
        assert!(reopened.get(keep.id).is_some());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let path = temp_store_path();
        let dir = path.parent().unwrap().to_path_buf();
        let mut store = JsonNoteStore::open(&path).unwrap();
        let kept = store.create("kept").unwrap();

        // A plain file where the directory was makes every write fail.
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "in the way").unwrap();

        assert!(store.create("never saved").is_err());
        assert_eq!(store.count(), 1);

        assert!(store.update(kept.id, "changed", Some(4)).is_err());
        let note = store.get(kept.id).unwrap();
        assert_eq!(note.text, "kept");
        assert_eq!(note.saved_index, 0);

        assert!(store.delete(kept.id).is_err());
        assert!(store.get(kept.id).is_some());

        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let path = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let result = JsonNoteStore::open(&path);
        assert!(matches!(result, Err(StorageError::Corrupt(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_initialize_writes_welcome_note() {
        let path = temp_store_path();
        let mut store = JsonNoteStore::open(&path).unwrap();
        store.initialize("Welcome to glance.").unwrap();

        let reopened = JsonNoteStore::open(&path).unwrap();
        assert_eq!(reopened.all()[0].text, "Welcome to glance.");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
