//! Configuration module for edgestack
//!
//! Handles loading and merging tool configuration from multiple sources:
//! - Default values
//! - User configuration (~/.edgestack.toml)
//! - Project configuration (./edgestack.toml)
//! - Environment variables
//! - Command-line arguments
//!
//! Stack settings (`Pulumi.yaml`, `Pulumi.<stack>.yaml`) are a separate layer,
//! see [`crate::settings`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lint::LintConfig;
use crate::render::RenderFormat;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "EDGESTACK_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings
    pub defaults: Defaults,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Rule selection for `check`
    pub lint: LintConfig,
}

/// Default configuration values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Stack to build when `--stack` is not given
    pub stack: Option<String>,

    /// Directory holding `Pulumi.yaml`
    pub project_dir: PathBuf,

    /// Where `render` writes when `--out` is not given (stdout otherwise)
    pub output: Option<PathBuf>,

    /// Render format
    pub format: RenderFormat,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            stack: None,
            project_dir: PathBuf::from("."),
            output: None,
            format: RenderFormat::Yaml,
        }
    }
}

/// Colors configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!("unknown log format '{}'", other))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when neither `RUST_LOG` nor `-v` is given
    pub level: String,

    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest precedence first
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        // Explicit path takes priority
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".edgestack.toml"));
        }

        paths.push(PathBuf::from("edgestack.toml"));

        if let Ok(env_config) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(env_config));
        }

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one
    fn merge(&self, other: Config) -> Config {
        let defaults = Defaults::default();
        let logging = LoggingConfig::default();

        Config {
            defaults: Defaults {
                stack: other.defaults.stack.or_else(|| self.defaults.stack.clone()),
                project_dir: if other.defaults.project_dir != defaults.project_dir {
                    other.defaults.project_dir
                } else {
                    self.defaults.project_dir.clone()
                },
                output: other
                    .defaults
                    .output
                    .or_else(|| self.defaults.output.clone()),
                format: if other.defaults.format != defaults.format {
                    other.defaults.format
                } else {
                    self.defaults.format
                },
            },
            colors: ColorsConfig {
                enabled: other.colors.enabled && self.colors.enabled,
            },
            logging: LoggingConfig {
                level: if other.logging.level != logging.level {
                    other.logging.level
                } else {
                    self.logging.level.clone()
                },
                format: if other.logging.format != logging.format {
                    other.logging.format
                } else {
                    self.logging.format
                },
            },
            lint: LintConfig {
                skip_rules: {
                    let mut skip = self.lint.skip_rules.clone();
                    for rule in other.lint.skip_rules {
                        if !skip.contains(&rule) {
                            skip.push(rule);
                        }
                    }
                    skip
                },
                min_severity: other.lint.min_severity.max(self.lint.min_severity),
                warnings_as_errors: other.lint.warnings_as_errors
                    || self.lint.warnings_as_errors,
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // EDGESTACK_STACK
        if let Ok(stack) = std::env::var("EDGESTACK_STACK") {
            if !stack.is_empty() {
                self.defaults.stack = Some(stack);
            }
        }

        // EDGESTACK_PROJECT_DIR
        if let Ok(dir) = std::env::var("EDGESTACK_PROJECT_DIR") {
            self.defaults.project_dir = PathBuf::from(dir);
        }

        // EDGESTACK_OUTPUT
        if let Ok(output) = std::env::var("EDGESTACK_OUTPUT") {
            let path = PathBuf::from(output);
            self.defaults.format = RenderFormat::from_path(&path);
            self.defaults.output = Some(path);
        }

        // EDGESTACK_LOG_FORMAT
        if let Ok(format) = std::env::var("EDGESTACK_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                self.logging.format = format;
            }
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        Config::default().merge_from_file(&path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::Severity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.project_dir, PathBuf::from("."));
        assert_eq!(config.defaults.format, RenderFormat::Yaml);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.colors.enabled);
        assert!(config.defaults.stack.is_none());
    }

    #[test]
    fn test_config_merge() {
        let base = Config {
            defaults: Defaults {
                stack: Some("dev".to_string()),
                ..Defaults::default()
            },
            lint: LintConfig {
                skip_rules: vec!["NM001".to_string()],
                ..LintConfig::default()
            },
            ..Config::default()
        };
        let other = Config {
            defaults: Defaults {
                format: RenderFormat::Json,
                ..Defaults::default()
            },
            lint: LintConfig {
                skip_rules: vec!["ST002".to_string()],
                min_severity: Severity::Warning,
                ..LintConfig::default()
            },
            ..Config::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.defaults.stack.as_deref(), Some("dev"));
        assert!(merged.colors.enabled);
        assert_eq!(merged.logging, LoggingConfig::default());
        assert_eq!(merged.defaults.format, RenderFormat::Json);
        assert_eq!(merged.lint.skip_rules, vec!["NM001", "ST002"]);
        assert_eq!(merged.lint.min_severity, Severity::Warning);
    }

    #[test]
    fn test_merge_keeps_earlier_colors_and_logging() {
        let base = Config {
            colors: ColorsConfig { enabled: false },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Json,
            },
            ..Config::default()
        };

        let merged = base.merge(Config::default());
        assert!(!merged.colors.enabled);
        assert_eq!(merged.logging.level, "debug");
        assert_eq!(merged.logging.format, LogFormat::Json);

        let later = Config {
            logging: LoggingConfig {
                level: "info".to_string(),
                ..LoggingConfig::default()
            },
            ..Config::default()
        };
        let merged = merged.merge(later);
        assert_eq!(merged.logging.level, "info");
        assert_eq!(merged.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/custom.toml");
        assert_eq!(Config::get_config_paths(Some(&explicit)), vec![explicit]);
    }
}
