//! Configuration file support for the `testdeps` tool.
//!
//! Configuration is read from an optional TOML file. Unknown fields are ignored, and
//! settings are layered: defaults < config file < command-line arguments.

use etcetera::BaseStrategy;
use std::path::{Path, PathBuf};
use testdeps_core::profile;

/// Root configuration structure.
///
/// All fields are optional so that partial files are accepted.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// CPU profiling options.
    pub profile: ProfileConfig,

    /// Test log inspection options.
    pub inspect: InspectConfig,
}

/// CPU profiling options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Sampling frequency, in Hz.
    pub frequency: Option<i32>,
}

/// Test log inspection options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Print per-operation counts instead of individual actions.
    pub summary: Option<bool>,
}

impl Config {
    /// Returns the sampling frequency to profile with.
    ///
    /// # Arguments
    ///
    /// * `cli_value` - Frequency given on the command line, if any.
    pub fn profile_frequency(&self, cli_value: Option<i32>) -> i32 {
        if let Some(frequency) = cli_value {
            return frequency;
        }

        match self.profile.frequency {
            Some(frequency) if frequency > 0 => frequency,
            Some(frequency) => {
                tracing::warn!("ignoring non-positive profile frequency {frequency} in config");
                profile::DEFAULT_FREQUENCY
            }
            None => profile::DEFAULT_FREQUENCY,
        }
    }

    /// Returns whether `inspect` should print a summary.
    ///
    /// # Arguments
    ///
    /// * `cli_value` - Value of the `--summary` flag.
    pub const fn inspect_summary(&self, cli_value: bool) -> bool {
        merge_bool_setting(cli_value, false, self.inspect.summary)
    }
}

/// Merges a boolean setting from CLI args, config file, and defaults.
///
/// A CLI flag that differs from its default was given explicitly and wins; otherwise the
/// config value applies if present.
const fn merge_bool_setting(
    cli_value: bool,
    cli_default: bool,
    config_value: Option<bool>,
) -> bool {
    if cli_value != cli_default {
        cli_value
    } else if let Some(config) = config_value {
        config
    } else {
        cli_default
    }
}

/// Result of attempting to load a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration, or default if loading failed.
    pub config: Config,

    /// The path that was used (or attempted) for loading.
    pub path: Option<PathBuf>,

    /// Any error that occurred during loading.
    pub error: Option<ConfigLoadError>,

    /// Whether the path was explicitly provided by the user (via `--config`).
    /// If true and there's an error, the tool fails rather than continuing.
    pub explicit_path: bool,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Returns the default configuration file path for the current platform.
///
/// Returns `None` if the platform's config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("testdeps").join("config.toml"))
}

/// Loads configuration from the specified path.
///
/// This function sets `explicit_path` to `false`; [`load_config`] distinguishes explicit
/// from default paths.
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    let loaded = std::fs::read_to_string(path)
        .map_err(ConfigLoadError::Io)
        .and_then(|content| toml::from_str(&content).map_err(ConfigLoadError::Parse));

    let (config, error) = match loaded {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    ConfigLoadResult {
        config,
        path: Some(path.to_path_buf()),
        error,
        explicit_path: false,
    }
}

/// Loads configuration based on the provided options.
///
/// # Arguments
///
/// * `disabled` - If true, skip loading and return defaults.
/// * `explicit_path` - If provided, use this path instead of the default.
pub fn load_config(disabled: bool, explicit_path: Option<&Path>) -> ConfigLoadResult {
    let defaults = |path| ConfigLoadResult {
        config: Config::default(),
        path,
        error: None,
        explicit_path: false,
    };

    if disabled {
        return defaults(None);
    }

    let Some(path) = explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
    else {
        return defaults(None);
    };

    // A missing default file just means defaults.
    if explicit_path.is_none() && !path.exists() {
        return defaults(Some(path));
    }

    let mut result = load_from_path(&path);
    result.explicit_path = explicit_path.is_some();
    result
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config() -> Result<()> {
        let config: Config = toml::from_str("")?;
        assert!(config.profile.frequency.is_none());
        assert!(config.inspect.summary.is_none());
        Ok(())
    }

    #[test]
    fn full_config() -> Result<()> {
        let config: Config = toml::from_str(
            r"
            [profile]
            frequency = 250

            [inspect]
            summary = true
            ",
        )?;

        assert_eq!(config.profile.frequency, Some(250));
        assert_eq!(config.inspect.summary, Some(true));
        Ok(())
    }

    #[test]
    fn unknown_fields_ignored() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [profile]
            frequency = 50
            output = "cpu.svg"

            [future-section]
            enabled = true
            "#,
        )?;

        assert_eq!(config.profile.frequency, Some(50));
        assert!(config.inspect.summary.is_none());
        Ok(())
    }

    #[test]
    fn frequency_precedence() -> Result<()> {
        let config: Config = toml::from_str("[profile]\nfrequency = 250\n")?;

        assert_eq!(config.profile_frequency(Some(10)), 10);
        assert_eq!(config.profile_frequency(None), 250);
        assert_eq!(
            Config::default().profile_frequency(None),
            profile::DEFAULT_FREQUENCY
        );
        Ok(())
    }

    #[test]
    fn non_positive_frequency_falls_back_to_default() -> Result<()> {
        let config: Config = toml::from_str("[profile]\nfrequency = 0\n")?;
        assert_eq!(config.profile_frequency(None), profile::DEFAULT_FREQUENCY);
        Ok(())
    }

    #[test]
    fn summary_precedence() -> Result<()> {
        let enabled: Config = toml::from_str("[inspect]\nsummary = true\n")?;
        let disabled: Config = toml::from_str("[inspect]\nsummary = false\n")?;

        assert!(enabled.inspect_summary(false));
        assert!(disabled.inspect_summary(true));
        assert!(!disabled.inspect_summary(false));
        assert!(!Config::default().inspect_summary(false));
        Ok(())
    }

    #[test]
    fn default_path_is_under_testdeps() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("testdeps/config.toml"));
        }
    }

    #[test]
    fn load_config_disabled() {
        let result = load_config(true, Some(Path::new("/nonexistent/config.toml")));
        assert!(result.path.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_nonexistent_explicit() {
        let result = load_config(false, Some(Path::new("/nonexistent/path/to/config.toml")));
        assert!(result.explicit_path);
        assert!(matches!(result.error, Some(ConfigLoadError::Io(_))));
    }

    #[test]
    fn load_config_reports_parse_errors() -> Result<()> {
        let dir = assert_fs::TempDir::new()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile\nfrequency = ")?;

        let result = load_config(false, Some(&path));
        assert!(matches!(result.error, Some(ConfigLoadError::Parse(_))));
        assert_eq!(result.path.as_deref(), Some(path.as_path()));
        Ok(())
    }
}
