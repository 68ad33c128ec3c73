use crate::app::mode::AppMode;
use crate::engine::PlaybackState;
use crate::reading::{split_pivot, TokenMode};

/// A word split around its pivot letter, owned for the render pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PivotWord {
    pub left: String,
    pub pivot: String,
    pub right: String,
}

impl PivotWord {
    pub fn new(word: &str) -> Self {
        let split = split_pivot(word);
        Self {
            left: split.left.to_string(),
            pivot: split.pivot.to_string(),
            right: split.right.to_string(),
        }
    }
}

/// Render state for UI components
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub mode: AppMode,
    pub token_mode: TokenMode,
    /// Current token in word mode
    pub current_word: Option<PivotWord>,
    /// Current token in sentence mode
    pub current_sentence: Option<String>,
    pub context_left: Vec<String>,
    pub context_right: Vec<String>,
    /// (index, len) of the active token sequence
    pub progress: (usize, usize),
    pub percent: f64,
    pub eta: String,
    pub rate_label: String,
    pub title: String,
    pub status: Option<String>,
    pub command_line: Option<String>,
    pub overlay: Option<Vec<String>>,
}

impl RenderState {
    /// Create an empty render state for when no document is loaded
    pub fn empty(mode: AppMode) -> Self {
        Self {
            mode,
            token_mode: TokenMode::Words,
            current_word: None,
            current_sentence: None,
            context_left: vec![],
            context_right: vec![],
            progress: (0, 0),
            percent: 0.0,
            eta: String::new(),
            rate_label: String::new(),
            title: String::new(),
            status: None,
            command_line: None,
            overlay: None,
        }
    }

    /// Token-level fields from a player's state. Text-level figures (percent,
    /// ETA, labels) are left for the caller.
    pub fn from_playback(
        mode: AppMode,
        token_mode: TokenMode,
        state: &PlaybackState,
        context_window: usize,
    ) -> Self {
        let tokens = state.tokens();
        let current_index = state.index().min(tokens.len());

        let start = current_index.saturating_sub(context_window);
        let context_left = tokens[start..current_index].to_vec();

        let right_start = (current_index + 1).min(tokens.len());
        let end = (current_index + context_window + 1).min(tokens.len());
        let context_right = tokens[right_start..end].to_vec();

        let current = tokens.get(current_index);
        let (current_word, current_sentence) = match token_mode {
            TokenMode::Words => (current.map(|t| PivotWord::new(t)), None),
            TokenMode::Sentences => (None, current.cloned()),
        };

        Self {
            token_mode,
            current_word,
            current_sentence,
            context_left,
            context_right,
            progress: (current_index, tokens.len()),
            ..Self::empty(mode)
        }
    }
}
