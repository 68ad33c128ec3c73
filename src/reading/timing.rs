use crate::engine::config::TimingConfig;
use std::time::Duration;

fn is_sentence_terminator(c: char) -> bool {
    c == '.' || c == '?' || c == '!'
}

fn is_clause_separator(c: char) -> bool {
    c == ',' || c == ';' || c == ':'
}

/// Display time for one token at `rate` tokens per minute, in milliseconds.
///
/// Only the first matching rule applies: a sentence terminator beats a clause
/// separator, which beats the long-word penalty.
pub fn word_delay_ms(token: &str, rate: f64, config: &TimingConfig) -> f64 {
    let base_delay = 60_000.0 / rate;

    let multiplier = match token.chars().last() {
        Some(c) if is_sentence_terminator(c) => config.sentence_multiplier,
        Some(c) if is_clause_separator(c) => config.clause_multiplier,
        _ if token.chars().count() > config.long_word_threshold => config.long_word_multiplier,
        _ => 1.0,
    };

    base_delay * multiplier
}

pub fn word_delay(token: &str, rate: f64, config: &TimingConfig) -> Duration {
    let micros = (word_delay_ms(token, rate, config) * 1000.0).round();
    Duration::from_micros(micros.max(0.0) as u64)
}
