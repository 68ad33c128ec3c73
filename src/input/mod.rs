//! Text sources for the reader.

pub mod clipboard;
pub mod epub;
pub mod html;
pub mod pdf;
pub mod text;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("PDF parse error: {0}")]
    PdfParse(String),

    #[error("EPUB parse error: {0}")]
    EpubParse(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable text in {0}")]
    Empty(String),
}

/// Plain text pulled from a source, plus a label such as `epub:book.epub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub text: String,
    pub source: String,
}

impl LoadedDocument {
    /// Rejects documents with no words in them.
    pub(crate) fn new(text: String, source: String) -> Result<Self, LoadError> {
        if text.split_whitespace().next().is_none() {
            return Err(LoadError::Empty(source));
        }
        Ok(Self { text, source })
    }
}

/// Loads a file, picking the reader from its extension.
pub fn load_path(path: impl AsRef<Path>) -> Result<LoadedDocument, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let document = match extension.as_str() {
        "txt" | "md" | "text" => text::load(path)?,
        "epub" => epub::load(path)?,
        "pdf" => pdf::load(path)?,
        _ => {
            return Err(LoadError::UnsupportedFormat(
                path.display().to_string(),
            ))
        }
    };

    info!(source = %document.source, bytes = document.text.len(), "loaded document");
    Ok(document)
}
