pub mod config;
pub mod error;
pub mod listeners;
pub mod pacer;
pub mod scheduler;

pub use config::{load_settings, Settings, SpeechConfig, TimingConfig};
pub use error::{GlanceError, PlaybackError};
pub use listeners::{ListenerId, Listeners};
pub use pacer::{DeadlinePacer, Pacer, SpeechPacer};
pub use scheduler::{PlaybackState, Scheduler, Ticket};
