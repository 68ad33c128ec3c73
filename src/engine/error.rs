use thiserror::Error;

use crate::input::LoadError;
use crate::storage::{PayloadError, StorageError};

/// Errors raised by the playback scheduler itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Rate must be a positive finite number, got {0}")]
    InvalidRate(f64),
}

/// Top-level error for the binary and the app layer.
#[derive(Error, Debug)]
pub enum GlanceError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {field}: {message}")]
    InvalidSetting { field: String, message: String },

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rate_message() {
        let err = PlaybackError::InvalidRate(-1.0);
        assert_eq!(err.to_string(), "Rate must be a positive finite number, got -1");
    }

    #[test]
    fn test_load_error_converts() {
        let err: GlanceError = LoadError::UnsupportedFormat("doc".to_string()).into();
        assert!(matches!(err, GlanceError::Load(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GlanceError = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
