//! Read-only progress figures derived from a text and a position in it.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Reading speed assumed by [`eta`], independent of the playback rate.
pub const ETA_WPM: usize = 300;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Percentage of `text` read when positioned at word `index`, with one
/// decimal place and capped at 100.
pub fn percent(text: &str, index: usize) -> f64 {
    let count = word_count(text);
    if count == 0 {
        return 0.0;
    }

    let tenths = (index as f64 / count as f64 * 1000.0).round();
    (tenths / 10.0).min(100.0)
}

/// Human estimate of the time left to read from `current` to `total` words.
pub fn eta(current: usize, total: usize) -> String {
    let remaining = total.saturating_sub(current);
    let minutes = remaining.div_ceil(ETA_WPM);

    if minutes <= 1 {
        return "1 min read".to_string();
    }

    if minutes > 60 {
        return format!("{} hours read", minutes.div_ceil(60));
    }

    format!("{} mins read", minutes)
}

/// Short count label: `999`, `1.2K`, `3M`, `1.5B`.
pub fn compact_count(count: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    for (scale, suffix) in UNITS {
        if count >= scale {
            let label = format!("{:.1}", count as f64 / scale as f64);
            let label = label.strip_suffix(".0").unwrap_or(&label);
            return format!("{}{}", label, suffix);
        }
    }

    count.to_string()
}

/// Month and day, e.g. `Oct 16`.
pub fn short_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%b %-d").to_string()
}
