use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reading::progress;

/// A saved text plus the word index the reader stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub saved_index: usize,
}

impl Note {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            last_modified: Utc::now(),
            saved_index: 0,
        }
    }

    /// First line of the text, shortened for lists.
    pub fn title(&self, max_chars: usize) -> String {
        let line = self.text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        if line.chars().count() <= max_chars {
            return line.to_string();
        }
        let mut title: String = line.chars().take(max_chars.saturating_sub(3)).collect();
        title.push_str("...");
        title
    }

    pub fn word_count(&self) -> usize {
        progress::word_count(&self.text)
    }

    pub fn percent_read(&self) -> f64 {
        progress::percent(&self.text, self.saved_index)
    }
}
