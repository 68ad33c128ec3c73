use arboard::Clipboard;

use super::{LoadError, LoadedDocument};

/// Reads the text currently on the system clipboard.
pub fn load() -> Result<LoadedDocument, LoadError> {
    let mut clipboard = Clipboard::new().map_err(|e| LoadError::Clipboard(e.to_string()))?;
    let text = clipboard
        .get_text()
        .map_err(|e| LoadError::Clipboard(e.to_string()))?;

    LoadedDocument::new(text, "clipboard".to_string())
}
