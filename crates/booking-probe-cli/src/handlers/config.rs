//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::CliResult;
use booking_probe::SuiteConfig;
use std::path::Path;

/// Print the effective (or default) configuration as YAML; with `--check`
/// only validate it
pub fn execute_config(config_path: Option<&Path>, args: &ConfigArgs) -> CliResult<Option<String>> {
    let config = if args.defaults {
        SuiteConfig::default()
    } else {
        SuiteConfig::read(config_path)?
    };
    if args.check {
        config.validate()?;
        return Ok(None);
    }
    Ok(Some(config.to_yaml()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render_as_yaml() {
        let args = ConfigArgs {
            defaults: true,
            check: false,
        };
        let yaml = execute_config(None, &args).unwrap().unwrap();
        assert!(yaml.contains("automationintesting.online"));
        assert!(yaml.contains("max_steps: 30"));
        assert_eq!(SuiteConfig::from_yaml_str(&yaml).unwrap(), SuiteConfig::default());
    }

    #[test]
    fn test_check_reports_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("bad.yaml");
        std::fs::write(&file, "calendar:\n  max_steps: 0\n").unwrap();
        let args = ConfigArgs {
            defaults: false,
            check: true,
        };
        let err = execute_config(Some(&file), &args).unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let args = ConfigArgs::default();
        let err = execute_config(Some(Path::new("/nonexistent/booking.yaml")), &args).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
