//! Demo configuration
//!
//! Loaded from `config/demo.toml` (or a `.ron` file given on the command
//! line). Every field has a default, so a partial file is fine.

use std::path::PathBuf;

use scene_kit::config::{ApplicationConfig, Config, ConfigError};
use serde::{Deserialize, Serialize};

use crate::demo::Demo;

/// Complete demo configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Engine, asset and media settings
    pub runtime: ApplicationConfig,
    /// Scene settings
    pub demo: DemoSettings,
}

impl Config for DemoConfig {}

impl DemoConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime.validate()?;
        self.demo.validate()
    }
}

/// A swarm of identical cubes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeSwarm {
    /// Number of cubes
    pub count: usize,
    /// Edge length of each cube mesh
    pub dimension: f32,
}

/// Scene construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Demo shown at startup
    pub initial_demo: Demo,
    /// Seconds between scripted taps; `None` disables them
    pub tap_interval_secs: Option<f64>,
    /// Swarm for the "few cubes" demo
    pub few_cubes: CubeSwarm,
    /// Swarm for the "many cubes" demo
    pub many_cubes: CubeSwarm,
    /// Half extent of the cube placed around the swarm origin
    pub swarm_extent: f32,
    /// Media locator streamed onto the video cube
    pub video_locator: String,
    /// Texture name for textured demos
    pub texture_name: String,
    /// Bunny model, relative to the assets directory
    pub bunny_model: PathBuf,
    /// Seed for cube placement; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            initial_demo: Demo::SingleCube,
            tap_interval_secs: Some(5.0),
            few_cubes: CubeSwarm {
                count: 100,
                dimension: 1.0,
            },
            many_cubes: CubeSwarm {
                count: 10_000,
                dimension: 0.5,
            },
            swarm_extent: 3.0,
            video_locator: "pattern:90@30".to_string(),
            texture_name: "bricks".to_string(),
            bunny_model: PathBuf::from("models/bunny.obj"),
            rng_seed: None,
        }
    }
}

impl DemoSettings {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tap_interval_secs.is_some_and(|secs| secs <= 0.0) {
            return Err(ConfigError::Invalid("tap_interval_secs must be positive".to_string()));
        }
        for swarm in [&self.few_cubes, &self.many_cubes] {
            if swarm.dimension <= 0.0 {
                return Err(ConfigError::Invalid("cube dimension must be positive".to_string()));
            }
        }
        if self.swarm_extent < 0.0 {
            return Err(ConfigError::Invalid("swarm_extent must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: DemoConfig = toml::from_str(
            "[demo]\ninitial_demo = \"bunny\"\nrng_seed = 7\n\n[runtime.engine]\nmax_frames = 30\n",
        )
        .unwrap();

        assert_eq!(config.demo.initial_demo, Demo::Bunny);
        assert_eq!(config.demo.rng_seed, Some(7));
        assert_eq!(config.demo.many_cubes.count, 10_000);
        assert_eq!(config.runtime.engine.max_frames, Some(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/demo.toml");
        let config = DemoConfig::load_from_file(path).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = DemoConfig::default();
        config.demo.tap_interval_secs = Some(0.0);
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.demo.few_cubes.dimension = -1.0;
        assert!(config.validate().is_err());
    }
}
