use std::fs;
use std::path::Path;

use super::{LoadError, LoadedDocument};

/// Reads a UTF-8 text file as-is.
pub fn load(path: &Path) -> Result<LoadedDocument, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    LoadedDocument::new(text, format!("txt:{}", path.display()))
}
