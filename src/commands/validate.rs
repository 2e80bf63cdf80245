use super::{GlobalArgs, Host};
use crate::Result;
use crate::universe::StaticUniverse;
use std::io::Write;

/// Load and validate the configuration, including the universe file it names.
fn validate_config_inner(args: &GlobalArgs) -> Result<()> {
    let config = args.load_config()?;

    if let Some(universe) = &config.universe {
        let _ = StaticUniverse::load(universe)?;
    }

    Ok(())
}

pub fn validate_config<H: Host>(host: &mut H, args: &GlobalArgs) -> Result<()> {
    match validate_config_inner(args) {
        Ok(()) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = &args.config {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration lookup (shorthand.toml)");
            }
            Ok(())
        }
        Err(e) => {
            host.fail(format_args!("Configuration validation failed: {e}"));
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::{LogLevel, TestHost};
    use camino::Utf8PathBuf;

    fn args(config: Utf8PathBuf) -> GlobalArgs {
        GlobalArgs {
            config: Some(config),
            log_level: LogLevel::None,
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_valid_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("shorthand.toml")).unwrap();
        std::fs::write(&config_path, "max_concurrent_scans = 8\n").unwrap();

        let mut host = TestHost::new();
        validate_config(&mut host, &args(config_path.clone())).unwrap();

        assert_eq!(
            host.output_str(),
            format!("Configuration file is valid\nConfig file: {config_path}\n")
        );
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_out_of_range_value_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("shorthand.toml")).unwrap();
        std::fs::write(&config_path, "max_concurrent_scans = 0\n").unwrap();

        let mut host = TestHost::new();
        let _ = validate_config(&mut host, &args(config_path)).unwrap_err();

        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_str().starts_with("❌ Configuration validation failed: max_concurrent_scans must be between 1 and 64, got 0"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_missing_universe_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().join("shorthand.toml")).unwrap();
        std::fs::write(&config_path, "universe = \"does-not-exist.json\"\n").unwrap();

        let mut host = TestHost::new();
        let _ = validate_config(&mut host, &args(config_path)).unwrap_err();
        assert_eq!(host.exit_code, Some(1));
    }
}
