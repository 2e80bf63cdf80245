//! Tool configuration
//!
//! Settings are read from `shorthand.toml` (or the file given with `--config`) and fall back
//! to the embedded `default_config.toml` when no file exists.

#[expect(clippy::module_inception, reason = "The type and its module share a name")]
mod config;

pub use config::{CONFIG_FILE_NAME, Config, DEFAULT_CONFIG_TOML};
