//! Console configuration loading from file and environment variables.

use nirwaan_voice::{VoiceConfig, VoiceError};
use serde::Deserialize;
use thiserror::Error;

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Engine settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal front-end settings.
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "nirwaan_voice=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Settings for the terminal stand-ins of the platform capabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Offer typed input as speech recognition. Turn off to run without a
    /// capture capability.
    #[serde(default = "default_true")]
    pub capture: bool,

    /// Offer printed output as speech synthesis.
    #[serde(default = "default_true")]
    pub synthesis: bool,

    /// Simulated speaking speed at rate 1.0.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,

    /// Location the guide starts at.
    #[serde(default = "default_start_location")]
    pub start_location: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_words_per_minute() -> u32 {
    165
}

fn default_start_location() -> String {
    "/auth".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            capture: true,
            synthesis: true,
            words_per_minute: default_words_per_minute(),
            start_location: default_start_location(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but holds values the engine rejects.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] VoiceError),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `NIRWAAN_LOG_LEVEL` overrides `logging.level`
/// - `NIRWAAN_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `NIRWAAN_LANGUAGE` overrides `voice.language`
/// - `NIRWAAN_REPLY_DELAY_MS` overrides `voice.reply_delay_ms`
/// - `NIRWAAN_GREETING_SETTLE_MS` overrides `voice.greeting_settle_ms`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the resulting engine configuration is invalid.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.voice.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(level) = var("NIRWAAN_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("NIRWAAN_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(language) = var("NIRWAAN_LANGUAGE") {
        config.voice.language = language;
    }
    if let Some(delay) = var("NIRWAAN_REPLY_DELAY_MS") {
        if let Ok(parsed) = delay.parse() {
            config.voice.reply_delay_ms = parsed;
        }
    }
    if let Some(settle) = var("NIRWAAN_GREETING_SETTLE_MS") {
        if let Ok(parsed) = settle.parse() {
            config.voice.greeting_settle_ms = parsed;
        }
    }
}
