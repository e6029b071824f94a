//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `default_level` is an `env_logger` filter string such as `"info"` or
/// `"scene_kit=debug,demo_app=info"`. A `RUST_LOG` variable in the
/// environment takes precedence. Calling this more than once is harmless.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
