//! Decoding of the text handed over by a launcher (bookmarklet, pipe, file).
//!
//! Two shapes are accepted: an object `{"text": "...", "current": 12}` where
//! `current` is optional, or a bare JSON string.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FramePayload {
    pub text: String,
    pub current: usize,
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload must be a string or an object with a text field")]
    UnexpectedShape,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Text(String),
    Frame {
        text: String,
        #[serde(default)]
        current: usize,
    },
}

impl FramePayload {
    pub fn decode(input: &str) -> Result<Self, PayloadError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        let raw: RawPayload =
            serde_json::from_value(value).map_err(|_| PayloadError::UnexpectedShape)?;

        Ok(match raw {
            RawPayload::Text(text) => FramePayload { text, current: 0 },
            RawPayload::Frame { text, current } => FramePayload { text, current },
        })
    }
}
