//! OVP (Optimal Viewing Position) pivot calculation
//!
//! Each word is rendered as `left`, `pivot`, `right` so the pivot letter can be
//! highlighted and kept at a fixed column. The pivot offset depends only on the
//! word length:
//! - 1 char word → position 0 (1st letter)
//! - 2-5 char words → position 1 (2nd letter)
//! - 6-9 char words → position 2 (3rd letter)
//! - 10-13 char words → position 3 (4th letter)
//! - 14+ char words → position 4 (5th letter)
//!
//! Lengths are counted in extended grapheme clusters so an accented letter or
//! emoji is never split across the pivot.

use unicode_segmentation::UnicodeSegmentation;

/// A word split around its pivot letter. All three parts borrow the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PivotSplit<'a> {
    pub left: &'a str,
    pub pivot: &'a str,
    pub right: &'a str,
}

/// Returns the 0-based pivot index for a word of `len` characters.
pub fn pivot_offset(len: usize) -> usize {
    let offset = match len {
        0..=1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    };

    if offset >= len {
        len.saturating_sub(1) / 2
    } else {
        offset
    }
}

pub fn split_pivot(word: &str) -> PivotSplit<'_> {
    if word.is_empty() {
        return PivotSplit::default();
    }

    let bounds: Vec<(usize, &str)> = word.grapheme_indices(true).collect();
    let (start, pivot) = bounds[pivot_offset(bounds.len())];
    let end = start + pivot.len();

    PivotSplit {
        left: &word[..start],
        pivot,
        right: &word[end..],
    }
}
