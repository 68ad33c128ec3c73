use std::fs;
use std::path::Path;

use super::{LoadError, LoadedDocument};

/// Extracts the text layer of a PDF with `pdf-extract`.
pub fn load(path: &Path) -> Result<LoadedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let buffer = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = pdf_extract::extract_text_from_mem(&buffer)
        .map_err(|e| LoadError::PdfParse(e.to_string()))?;

    LoadedDocument::new(text, format!("pdf:{}", path.display()))
}
