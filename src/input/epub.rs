use std::path::Path;

use tracing::debug;

use super::html::extract_plain_text;
use super::{LoadError, LoadedDocument};

/// Loads every chapter in spine order as plain text, chapters separated by a
/// blank line.
pub fn load(path: &Path) -> Result<LoadedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let mut doc =
        epub::doc::EpubDoc::new(path).map_err(|e| LoadError::EpubParse(e.to_string()))?;

    let num_chapters = doc.get_num_chapters();
    if num_chapters == 0 {
        return Err(LoadError::EpubParse("No chapters found in EPUB".to_string()));
    }

    let mut chapters = Vec::with_capacity(num_chapters);
    for chapter_idx in 0..num_chapters {
        if !doc.set_current_chapter(chapter_idx) {
            continue;
        }

        if let Some((chapter_content, _mime)) = doc.get_current_str() {
            let plain_text = extract_plain_text(&chapter_content);
            if !plain_text.is_empty() {
                chapters.push(plain_text);
            }
        }
    }

    debug!(chapters = chapters.len(), of = num_chapters, "extracted epub chapters");
    LoadedDocument::new(chapters.join("\n\n"), format!("epub:{}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epub_load_nonexistent_file() {
        let result = load(Path::new("/nonexistent/path/book.epub"));
        assert!(matches!(result, Err(LoadError::FileNotFound(_))));
    }

    #[test]
    fn test_epub_garbage_is_parse_error() {
        let path = std::env::temp_dir().join(format!("glance-{}.epub", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"not a zip archive").unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(LoadError::EpubParse(_))));

        let _ = std::fs::remove_file(&path);
    }
}
