//! Configuration
//!
//! Everything about the story that is not the story itself: typing pace,
//! when controls appear, the anniversary date and how sound is played.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the surface through [`ConfigOverrides`])
//! 2. Environment variables (`VALENTINE_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at `$XDG_CONFIG_HOME/secret-valentine/config.toml`
//! (typically `~/.config/secret-valentine/config.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [pacing]
//! typing_speed_ms = 60
//! deleting_speed_ms = 30
//! pause_duration_ms = 1500
//! control_delay_per_char_ms = 60
//! control_delay_fixed_ms = 600
//!
//! [story]
//! together_since = "2025-06-23"
//! wide_viewport_cols = 100
//!
//! [audio]
//! muted = false
//! sounds_dir = "/usr/share/secret-valentine/sound"
//! player = ["ffplay", "-nodisp", "-autoexit", "-ss", "{offset}", "-t", "{duration}", "{path}"]
//! talking_clip_ms = 15000
//! hover_clip_ms = 3000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialogue::TypingConfig;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Pacing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingToml {
    /// Milliseconds per typed character
    pub typing_speed_ms: Option<u64>,

    /// Milliseconds per erased character
    pub deleting_speed_ms: Option<u64>,

    /// Pause after a typed line, in milliseconds
    pub pause_duration_ms: Option<u64>,

    /// Control delay per character of the line, in milliseconds
    pub control_delay_per_char_ms: Option<u64>,

    /// Fixed part of the control delay, in milliseconds
    pub control_delay_fixed_ms: Option<u64>,
}

/// Story section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryToml {
    /// Anniversary, `YYYY-MM-DD`
    pub together_since: Option<String>,

    /// Terminal width above which the screen counts as wide
    pub wide_viewport_cols: Option<u16>,
}

/// Audio section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioToml {
    /// Disable every sound
    pub muted: Option<bool>,

    /// Directory holding the sound files
    pub sounds_dir: Option<PathBuf>,

    /// Player command and arguments with placeholders
    pub player: Option<Vec<String>>,

    /// Length of the talking clip in milliseconds
    pub talking_clip_ms: Option<u64>,

    /// Length of the hover clip in milliseconds
    pub hover_clip_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValentineToml {
    /// Pacing section
    pub pacing: PacingToml,

    /// Story section
    pub story: StoryToml,

    /// Audio section
    pub audio: AudioToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// When the skip/advance control appears after a line starts typing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlDelay {
    /// Time per character of the line
    pub per_char: Duration,
    /// Time added once per line
    pub fixed: Duration,
}

impl Default for ControlDelay {
    fn default() -> Self {
        Self {
            per_char: Duration::from_millis(60),
            fixed: Duration::from_millis(600),
        }
    }
}

impl ControlDelay {
    /// Delay for a line of text
    #[must_use]
    pub fn for_line(&self, line: &str) -> Duration {
        let chars = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
        self.per_char.saturating_mul(chars).saturating_add(self.fixed)
    }
}

/// How sounds are found and played
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioConfig {
    /// No sound at all
    pub muted: bool,
    /// Player command; `{path}`, `{offset}`, `{duration}` and `{volume}` are
    /// replaced per playback. Empty disables playback.
    pub player: Vec<String>,
    /// Directory holding `talking.mp3`, `correct.mp3` and `hover.mp3`
    pub sounds_dir: PathBuf,
    /// Length of the talking clip
    pub talking_clip: Duration,
    /// Length of the hover clip
    pub hover_clip: Duration,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            player: default_player(),
            sounds_dir: PathBuf::from("assets/sound"),
            talking_clip: Duration::from_secs(15),
            hover_clip: Duration::from_secs(3),
        }
    }
}

fn default_player() -> Vec<String> {
    [
        "ffplay",
        "-nodisp",
        "-autoexit",
        "-loglevel",
        "quiet",
        "-ss",
        "{offset}",
        "-t",
        "{duration}",
        "-af",
        "volume={volume}",
        "{path}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Centralized story configuration
///
/// Use [`load_config`] to load it with proper priority handling.
#[derive(Clone, Debug)]
pub struct StoryConfig {
    /// Typewriter pacing for dialogue
    pub typing: TypingConfig,

    /// When controls appear
    pub control_delay: ControlDelay,

    /// Anniversary for the time-together counter
    pub together_since: NaiveDate,

    /// Terminal width above which the proposal uses wide dodge jumps
    pub wide_viewport_cols: u16,

    /// Sound settings
    pub audio: AudioConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

/// The day it all started
#[must_use]
pub fn default_together_since() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 23).unwrap_or(NaiveDate::MIN)
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            typing: TypingConfig::default(),
            control_delay: ControlDelay::default(),
            together_since: default_together_since(),
            wide_viewport_cols: 100,
            audio: AudioConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StoryConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ConfigError::ValidationError(format!("together_since `{value}` is not YYYY-MM-DD: {e}"))
    })
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/secret-valentine/config.toml` or
/// `~/.config/secret-valentine/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("secret-valentine").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<StoryConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// holds a value that makes no sense.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StoryConfig, ConfigError> {
    let mut config = StoryConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ValentineToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StoryConfig, toml: &ValentineToml) -> Result<(), ConfigError> {
    // Pacing
    if let Some(ms) = toml.pacing.typing_speed_ms {
        config.typing.typing_speed = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.deleting_speed_ms {
        config.typing.deleting_speed = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.pause_duration_ms {
        config.typing.pause_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.control_delay_per_char_ms {
        config.control_delay.per_char = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.control_delay_fixed_ms {
        config.control_delay.fixed = Duration::from_millis(ms);
    }

    // Story
    if let Some(ref since) = toml.story.together_since {
        config.together_since = parse_date(since)?;
    }
    if let Some(cols) = toml.story.wide_viewport_cols {
        config.wide_viewport_cols = cols;
    }

    // Audio
    if let Some(muted) = toml.audio.muted {
        config.audio.muted = muted;
    }
    if let Some(ref dir) = toml.audio.sounds_dir {
        config.audio.sounds_dir.clone_from(dir);
    }
    if let Some(ref player) = toml.audio.player {
        config.audio.player.clone_from(player);
    }
    if let Some(ms) = toml.audio.talking_clip_ms {
        config.audio.talking_clip = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.audio.hover_clip_ms {
        config.audio.hover_clip = Duration::from_millis(ms);
    }

    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut StoryConfig) {
    if let Ok(muted) = std::env::var("VALENTINE_MUTE") {
        config.audio.muted = muted == "1" || muted.to_lowercase() == "true";
        config.source = ConfigSource::Env;
    }
    if let Ok(player) = std::env::var("VALENTINE_PLAYER") {
        config.audio.player = player.split_whitespace().map(String::from).collect();
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("VALENTINE_SOUNDS_DIR") {
        config.audio.sounds_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(speed) = std::env::var("VALENTINE_TYPING_SPEED_MS") {
        if let Ok(ms) = speed.parse::<u64>() {
            config.typing.typing_speed = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(since) = std::env::var("VALENTINE_TOGETHER_SINCE") {
        match parse_date(&since) {
            Ok(date) => {
                config.together_since = date;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring VALENTINE_TOGETHER_SINCE"),
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Mute override
    pub muted: Option<bool>,

    /// Player command override
    pub player: Option<Vec<String>>,

    /// Sounds directory override
    pub sounds_dir: Option<PathBuf>,

    /// Typing speed override (milliseconds per character)
    pub typing_speed_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set mute override
    #[must_use]
    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = Some(muted);
        self
    }

    /// Set player command override
    #[must_use]
    pub fn with_player(mut self, player: Vec<String>) -> Self {
        self.player = Some(player);
        self
    }

    /// Set sounds directory override
    #[must_use]
    pub fn with_sounds_dir(mut self, dir: PathBuf) -> Self {
        self.sounds_dir = Some(dir);
        self
    }

    /// Set typing speed override
    #[must_use]
    pub fn with_typing_speed_ms(mut self, ms: u64) -> Self {
        self.typing_speed_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut StoryConfig) {
        if self.muted.is_some()
            || self.player.is_some()
            || self.sounds_dir.is_some()
            || self.typing_speed_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(muted) = self.muted {
            config.audio.muted = muted;
        }
        if let Some(ref player) = self.player {
            config.audio.player.clone_from(player);
        }
        if let Some(ref dir) = self.sounds_dir {
            config.audio.sounds_dir.clone_from(dir);
        }
        if let Some(ms) = self.typing_speed_ms {
            config.typing.typing_speed = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
