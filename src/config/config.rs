use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the base directory when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "shorthand.toml";

const MAX_CONCURRENT_SCANS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Skip unknown flag-list entries instead of rejecting the directive
    #[serde(default)]
    pub tolerant_parsing: bool,

    /// Number of type-universe scans allowed to run at once
    #[serde(default = "default_max_concurrent_scans")]
    pub max_concurrent_scans: usize,

    /// Loader whose chain is visible in every scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_loader: Option<String>,

    /// Upper bound on a single template compilation, in milliseconds
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,

    /// Type universe used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe: Option<Utf8PathBuf>,
}

const fn default_max_concurrent_scans() -> usize {
    4
}

const fn default_compile_timeout_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(base: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // No config file found, use defaults
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    #[must_use]
    pub const fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CONCURRENT_SCANS).contains(&self.max_concurrent_scans) {
            return Err(app_err!(
                "max_concurrent_scans must be between 1 and {MAX_CONCURRENT_SCANS}, got {}",
                self.max_concurrent_scans
            ));
        }

        if self.compile_timeout_ms == 0 {
            return Err(app_err!("compile_timeout_ms must be greater than 0"));
        }

        if let Some(loader) = &self.context_loader
            && loader.trim().is_empty()
        {
            return Err(app_err!("context_loader must not be blank"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(!config.tolerant_parsing);
        assert_eq!(config.max_concurrent_scans, 4);
        assert_eq!(config.compile_timeout(), Duration::from_secs(1));
        assert!(config.context_loader.is_none());
        assert!(config.universe.is_none());
    }

    #[test]
    fn test_validate_scans_out_of_range() {
        let config = Config {
            max_concurrent_scans: 0,
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();

        let config = Config {
            max_concurrent_scans: 65,
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();

        let config = Config {
            max_concurrent_scans: 64,
            ..Config::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            compile_timeout_ms: 0,
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_validate_blank_context_loader() {
        let config = Config {
            context_loader: Some("  ".to_string()),
            ..Config::default()
        };
        let _ = config.validate().unwrap_err();
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let _ = toml::from_str::<Config>("max_scans = 3").unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = Utf8PathBuf::try_from(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        Config::save_default(&output_path).unwrap();
        let loaded = Config::load(&Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap(), Some(&output_path)).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_from_base_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(base.join(CONFIG_FILE_NAME), "tolerant_parsing = true\ncontext_loader = \"app\"\n").unwrap();

        let config = Config::load(&base, None).unwrap();
        assert!(config.tolerant_parsing);
        assert_eq!(config.context_loader.as_deref(), Some("app"));
        assert_eq!(config.max_concurrent_scans, 4);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config::load(&base, None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_config_toml_is_not_empty() {
        assert!(!DEFAULT_CONFIG_TOML.is_empty());
    }
}
