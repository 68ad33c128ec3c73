pub mod ovp;
pub mod progress;
pub mod timing;
pub mod token;

pub use ovp::{pivot_offset, split_pivot, PivotSplit};
pub use progress::{compact_count, eta, percent, short_date, word_count};
pub use timing::{word_delay, word_delay_ms};
pub use token::{
    first_word_of_sentence, sentence_for_word, tokenize, tokenize_sentences, tokenize_words,
    TokenMode,
};
