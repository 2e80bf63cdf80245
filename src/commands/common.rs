//! Arguments and setup shared by every command.

use crate::Result;
use crate::config::Config;
use crate::directive::ParseTolerance;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Options accepted by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to configuration file (default is `shorthand.toml`)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

impl GlobalArgs {
    /// Load the configuration named by `--config`, or `shorthand.toml` in the current directory.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(Utf8Path::new("."), self.config.as_ref())
    }
}

/// Pick the parse mode from a command-line override and the configuration.
pub const fn tolerance(tolerant_flag: bool, config: &Config) -> ParseTolerance {
    if tolerant_flag || config.tolerant_parsing {
        ParseTolerance::Tolerant
    } else {
        ParseTolerance::Strict
    }
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // A second initialization in the same process keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}
