use std::ops::Range;

/// What a token stands for: one word (RSVP) or one sentence (speech).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenMode {
    #[default]
    Words,
    Sentences,
}

fn is_sentence_terminator(c: char) -> bool {
    c == '.' || c == '?' || c == '!'
}

/// Splits on runs of whitespace. Punctuation stays attached to its word.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Splits after every run of terminal punctuation and trims each piece.
///
/// This is a heuristic: abbreviations ("Dr."), decimals ("3.14") and quoted
/// speech are split like any other terminator.
pub fn tokenize_sentences(text: &str) -> Vec<String> {
    sentence_spans(text)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}

/// Byte ranges of the trimmed sentences of `text`.
fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_sentence_terminator(c) {
            continue;
        }

        // Swallow stacked terminators ("?!", "...") into the same sentence.
        while let Some(&(_, next)) = chars.peek() {
            if is_sentence_terminator(next) {
                chars.next();
            } else {
                break;
            }
        }

        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        push_trimmed(&mut spans, text, start..end);
        start = end;
    }

    push_trimmed(&mut spans, text, start..text.len());
    spans
}

fn push_trimmed(out: &mut Vec<Range<usize>>, text: &str, span: Range<usize>) {
    let piece = &text[span.clone()];
    let trimmed = piece.trim_start();
    let start = span.start + (piece.len() - trimmed.len());
    let end = start + trimmed.trim_end().len();
    if start < end {
        out.push(start..end);
    }
}

/// Byte ranges of the whitespace-delimited words of `text`.
fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

pub fn tokenize(text: &str, mode: TokenMode) -> Vec<String> {
    match mode {
        TokenMode::Words => tokenize_words(text),
        TokenMode::Sentences => tokenize_sentences(text),
    }
}

/// Index of the sentence in which word `word` of `text` starts, or the
/// sentence count when the word lies past the end.
pub fn sentence_for_word(text: &str, word: usize) -> usize {
    let sentences = sentence_spans(text);
    match word_spans(text).get(word) {
        Some(span) => sentences
            .iter()
            .position(|sentence| span.start < sentence.end)
            .unwrap_or(sentences.len()),
        None => sentences.len(),
    }
}

/// Index of the word holding the first character of sentence `sentence`, or
/// the word count when the sentence lies past the end.
pub fn first_word_of_sentence(text: &str, sentence: usize) -> usize {
    let words = word_spans(text);
    match sentence_spans(text).get(sentence) {
        Some(span) => words.iter().take_while(|word| word.end <= span.start).count(),
        None => words.len(),
    }
}
