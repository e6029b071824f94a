//! # Configuration
//!
//! Serde-backed configuration structs for the engine loop, asset lookup and
//! media decoding, plus the [`Config`] trait that loads and saves any of them
//! as TOML or RON depending on the file extension.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration trait
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration, falling back to defaults when the file is missing
    ///
    /// Any other failure (bad syntax, unsupported extension) is returned.
    fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::warn!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// # Engine Configuration
///
/// Frame loop pacing and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Target FPS for frame rate limiting; `None` runs unthrottled
    pub target_fps: Option<u32>,
    /// Advance time by exactly `1 / target_fps` per frame instead of reading the wall clock
    pub fixed_timestep: bool,
    /// Stop after this many frames; `None` runs until the application quits
    pub max_frames: Option<u64>,
    /// Drawable width in pixels
    pub drawable_width: u32,
    /// Drawable height in pixels
    pub drawable_height: u32,
    /// Seconds between FPS log lines
    pub stats_interval_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            target_fps: Some(60),
            fixed_timestep: false,
            max_frames: None,
            drawable_width: 1170,
            drawable_height: 2532,
            stats_interval_secs: 2.0,
        }
    }
}

impl EngineConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == Some(0) {
            return Err(ConfigError::Invalid("target_fps must be at least 1".to_string()));
        }
        if self.fixed_timestep && self.target_fps.is_none() {
            return Err(ConfigError::Invalid("fixed_timestep requires target_fps".to_string()));
        }
        if self.drawable_width == 0 || self.drawable_height == 0 {
            return Err(ConfigError::Invalid("drawable size must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// # Asset Configuration
///
/// Where named textures and models are looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: PathBuf,
    /// Texture directory, relative to `assets_dir`
    pub texture_dir: PathBuf,
    /// Extensions tried, in order, when resolving a texture name
    pub texture_extensions: Vec<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("resources"),
            texture_dir: PathBuf::from("textures"),
            texture_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

impl AssetConfig {
    /// Full texture directory
    pub fn texture_path(&self) -> PathBuf {
        self.assets_dir.join(&self.texture_dir)
    }

    /// Resolve a path relative to `assets_dir` (absolute paths pass through)
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.assets_dir.join(path)
    }
}

/// # Media Configuration
///
/// Defaults for streamed video sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Frame rate used for image sequences that do not specify one
    pub default_frame_rate: f64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { default_frame_rate: 30.0 }
    }
}

/// # Complete Application Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine loop configuration
    pub engine: EngineConfig,
    /// Asset lookup configuration
    pub assets: AssetConfig,
    /// Media decoding configuration
    pub media: MediaConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.media.default_frame_rate <= 0.0 {
            return Err(ConfigError::Invalid("default_frame_rate must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}
