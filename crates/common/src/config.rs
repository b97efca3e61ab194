//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TitlecardError, TitlecardResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Title-card rendering and encoding settings.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (e.g. "0.0.0.0:8000").
    pub bind_address: String,
}

/// Title-card rendering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Card duration used when a request omits it.
    pub default_duration_secs: u32,

    /// Largest card duration a request may ask for.
    pub max_duration_secs: u32,

    /// TrueType/OpenType font used for the card. `None` searches system fonts.
    pub font_path: Option<PathBuf>,

    /// Glyph size in pixels.
    pub font_px: f32,

    /// Vertical gap between consecutive lines, in pixels.
    pub line_spacing: u32,

    /// Fraction of the frame width available to a line of text.
    pub max_width_ratio: f32,

    /// ffmpeg video encoder.
    pub video_codec: String,

    /// ffmpeg audio encoder.
    pub audio_codec: String,

    /// x264 preset.
    pub preset: String,

    /// Parent directory for per-request scratch directories. `None` uses the OS temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Upper bound on fetching the source video. Unbounded when unset.
    pub fetch_timeout_secs: Option<u64>,

    /// Upper bound on a single ffmpeg encode. Unbounded when unset.
    pub encode_timeout_secs: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "titlecard=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            default_duration_secs: 5,
            max_duration_secs: 600,
            font_path: None,
            font_px: 32.0,
            line_spacing: 40,
            max_width_ratio: 0.8,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            temp_dir: None,
            fetch_timeout_secs: None,
            encode_timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], errors are returned.
    pub fn load_from(path: &Path) -> TitlecardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write config as pretty JSON to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> TitlecardResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> TitlecardResult<()> {
        let render = &self.render;
        if render.max_duration_secs == 0 {
            return Err(TitlecardError::config("max_duration_secs must be at least 1"));
        }
        if render.default_duration_secs == 0
            || render.default_duration_secs > render.max_duration_secs
        {
            return Err(TitlecardError::config(format!(
                "default_duration_secs must be within 1..={}",
                render.max_duration_secs
            )));
        }
        if !(render.max_width_ratio > 0.0 && render.max_width_ratio <= 1.0) {
            return Err(TitlecardError::config(
                "max_width_ratio must be within (0.0, 1.0]",
            ));
        }
        if render.font_px <= 0.0 {
            return Err(TitlecardError::config("font_px must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("titlecard").join("config.json")
}
