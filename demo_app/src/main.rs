//! Cube demos
//!
//! Cycles through the example scenes (single cube, textured cube, video
//! cube, cube swarms, bunny) on each tap. Runs on the headless backend; taps
//! come from a timer when `tap_interval_secs` is set.
//!
//! Usage: `cube_demos [config.toml|config.ron]`

mod app;
mod config;
mod demo;
mod events;
mod scenes;

use std::path::PathBuf;

use scene_kit::config::Config;
use scene_kit::foundation::logging;
use scene_kit::{Engine, EventSource, NoEvents};

use crate::app::DemoApp;
use crate::config::DemoConfig;
use crate::events::TapScript;

const DEFAULT_CONFIG: &str = "config/demo.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    let config = DemoConfig::load_or_default(&config_path)?;
    logging::init(&config.runtime.engine.log_level);
    config.validate()?;

    log::info!("Cube demos starting with {:?}", config_path);
    if let Ok(cwd) = std::env::current_dir() {
        log::debug!("Current working directory: {:?}", cwd);
    }

    let mut engine = Engine::headless(&config.runtime)?;
    let mut events: Box<dyn EventSource> = match config.demo.tap_interval_secs {
        Some(interval) => {
            let size = (config.runtime.engine.drawable_width, config.runtime.engine.drawable_height);
            Box::new(TapScript::new(interval, size))
        }
        None => Box::new(NoEvents),
    };

    let mut app = DemoApp::new(config.demo.clone(), config.runtime.media.clone());
    engine.run(&mut app, events.as_mut())?;

    log::info!("Cube demos exiting on {} ({} failed scene builds)", app.current(), app.failed_builds());
    Ok(())
}
