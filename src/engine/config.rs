// Configuration for glance engine and UI components
// Every section has defaults; a TOML file and GLANCE__* env vars override them.

use crate::engine::error::GlanceError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Word-mode timing: rate bounds and per-token delay multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Words per minute reading speed (default 500)
    pub wpm: u32,

    /// Minimum and maximum allowed WPM
    pub min_wpm: u32,
    pub max_wpm: u32,

    /// WPM change per rate key press
    pub wpm_step: u32,

    /// Words longer than this many chars get the long-word multiplier
    pub long_word_threshold: usize,

    pub sentence_multiplier: f64,  // . ! ?
    pub clause_multiplier: f64,    // , ; :
    pub long_word_multiplier: f64, // > long_word_threshold chars
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wpm: 500,
            min_wpm: 50,
            max_wpm: 1500,
            wpm_step: 25,
            long_word_threshold: 8,
            sentence_multiplier: 2.2,
            clause_multiplier: 1.5,
            long_word_multiplier: 1.2,
        }
    }
}

impl TimingConfig {
    pub fn wpm_range(&self) -> RangeInclusive<u32> {
        self.min_wpm..=self.max_wpm
    }

    pub fn clamp_wpm(&self, wpm: i64) -> u32 {
        wpm.clamp(self.min_wpm as i64, self.max_wpm as i64) as u32
    }
}

/// Speech engine subprocess configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Program invoked once per sentence (e.g. `espeak-ng`, `say`)
    pub program: String,

    /// Flag followed by words-per-minute
    pub rate_flag: String,

    /// Flag followed by the voice name; unused when `voice` is None
    pub voice_flag: String,

    pub voice: Option<String>,

    /// Engine speed in WPM at rate 1.0
    pub base_wpm: u32,

    /// Speech rate multiplier (default 1.0)
    pub rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    pub rate_step: f64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            rate_flag: "-s".to_string(),
            voice_flag: "-v".to_string(),
            voice: None,
            base_wpm: 175,
            rate: 1.0,
            min_rate: 0.5,
            max_rate: 3.0,
            rate_step: 0.1,
        }
    }
}

impl SpeechConfig {
    pub fn clamp_rate(&self, rate: f64) -> f64 {
        rate.clamp(self.min_rate, self.max_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding all notes
    pub notes_path: PathBuf,

    /// Text of the note created when the store is empty
    pub welcome_text: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            notes_path: data_dir().join("notes.json"),
            welcome_text: "Welcome to glance! Load a file with @path or paste with @@.".to_string(),
        }
    }
}

/// Theme configuration, hex colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Background color (#1A1B26 - Stormy Dark)
    pub background_color: String,

    /// Text color (#A9B1D6 - Light Blue)
    pub text_color: String,

    /// Pivot letter color (#F7768E - Coral Red)
    pub anchor_color: String,

    /// Context and hints (#646E96 - Dimmed Blue)
    pub dimmed_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_color: "#1A1B26".to_string(),
            text_color: "#A9B1D6".to_string(),
            anchor_color: "#F7768E".to_string(),
            dimmed_color: "#646E96".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    pub level: String,

    /// Log file; the terminal belongs to the reader view
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "glance=info".to_string(),
            file: data_dir().join("glance.log"),
        }
    }
}

/// Master configuration combining all glance settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timing: TimingConfig,
    pub speech: SpeechConfig,
    pub storage: StorageConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), GlanceError> {
        let timing = &self.timing;
        if timing.min_wpm == 0 || timing.min_wpm > timing.max_wpm {
            return Err(GlanceError::InvalidSetting {
                field: "timing.min_wpm".to_string(),
                message: format!("expected 0 < min_wpm <= max_wpm ({})", timing.max_wpm),
            });
        }
        if !timing.wpm_range().contains(&timing.wpm) {
            return Err(GlanceError::InvalidSetting {
                field: "timing.wpm".to_string(),
                message: format!("{} is outside {}..={}", timing.wpm, timing.min_wpm, timing.max_wpm),
            });
        }

        let speech = &self.speech;
        if !(speech.min_rate > 0.0 && speech.min_rate <= speech.max_rate) {
            return Err(GlanceError::InvalidSetting {
                field: "speech.min_rate".to_string(),
                message: format!("expected 0 < min_rate <= max_rate ({})", speech.max_rate),
            });
        }
        if !(speech.min_rate..=speech.max_rate).contains(&speech.rate) {
            return Err(GlanceError::InvalidSetting {
                field: "speech.rate".to_string(),
                message: format!(
                    "{} is outside {}..={}",
                    speech.rate, speech.min_rate, speech.max_rate
                ),
            });
        }
        if speech.program.trim().is_empty() {
            return Err(GlanceError::InvalidSetting {
                field: "speech.program".to_string(),
                message: "must name an executable".to_string(),
            });
        }

        Ok(())
    }
}

/// Loads settings in order of precedence:
/// 1. Environment variables (GLANCE__ prefix, `__` between sections)
/// 2. `path`, if given and present
/// 3. Built-in defaults
pub fn load_settings(path: Option<&Path>) -> Result<Settings, GlanceError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("GLANCE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// `$XDG_DATA_HOME/glance`, falling back to `~/.local/share/glance`, then the
/// working directory.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("glance");
    }

    match std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(".local/share/glance"),
        None => PathBuf::from(".glance"),
    }
}
