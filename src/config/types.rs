//! Configuration types.
//!
//! This module defines the engine preferences and the logging enums shared
//! with the command-line front end.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_MIN_FUTURE_EXPIRES_SECS, DEFAULT_RULESET_ID};
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable grade card (default)
    Plain,
    /// Result set and statistics as JSON
    Json,
}

/// Engine preferences (no CLI dependencies).
///
/// Every field has a default, so a JSON preferences file only needs to name
/// the knobs it changes. Field names are camelCase on the wire.
///
/// # Examples
///
/// ```
/// use pagegrade::EngineConfig;
///
/// let config = EngineConfig {
///     allow_negative_score: true,
///     ..Default::default()
/// };
/// assert!(config.exclude_beacons_from_lint);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Hide components fetched after the onload event from type lookups
    pub exclude_after_onload: bool,

    /// Hide 1x1 tracking images from type lookups
    pub exclude_beacons_from_lint: bool,

    /// Minimum far-future expiry in seconds; also overrides `yexpires.howfar`
    pub min_future_expires_seconds: i64,

    /// Keep negative rule scores instead of clamping them to zero
    pub allow_negative_score: bool,

    /// Ruleset used when the caller does not name one
    pub default_ruleset_id: String,

    /// Extra CDN host patterns appended to `ycdn.patterns`
    pub cdn_hostnames: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exclude_after_onload: true,
            exclude_beacons_from_lint: true,
            min_future_expires_seconds: DEFAULT_MIN_FUTURE_EXPIRES_SECS,
            allow_negative_score: false,
            default_ruleset_id: DEFAULT_RULESET_ID.to_string(),
            cdn_hostnames: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Reads preferences from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigReadError` if the file cannot be read
    /// and `InitializationError::ConfigParseError` if it is not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, InitializationError> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Parses a comma-separated host list the way preference stores keep it.
    pub fn with_cdn_hostnames_csv(mut self, csv: &str) -> Self {
        self.cdn_hostnames.extend(
            csv.split(',')
                .map(str::trim)
                .filter(|host| !host.is_empty())
                .map(str::to_string),
        );
        self
    }
}

/// What to grade and how.
///
/// # Examples
///
/// ```no_run
/// use pagegrade::GradeOptions;
/// use std::path::PathBuf;
///
/// let options = GradeOptions {
///     capture: PathBuf::from("capture.json"),
///     ruleset: Some("yblog".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GradeOptions {
    /// Captured page (JSON)
    pub capture: PathBuf,

    /// Engine preferences file (JSON)
    pub config_file: Option<PathBuf>,

    /// Ruleset to apply instead of the default
    pub ruleset: Option<String>,

    /// Custom rulesets file (JSON)
    pub custom_rulesets: Option<PathBuf>,

    /// Comma-separated CDN host patterns
    pub cdn_hostnames: Option<String>,

    /// Keep negative rule scores
    pub allow_negative_score: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Report format
    pub output: OutputFormat,
}

impl Default for GradeOptions {
    fn default() -> Self {
        Self {
            capture: PathBuf::from("capture.json"),
            config_file: None,
            ruleset: None,
            custom_rulesets: None,
            cdn_hostnames: None,
            allow_negative_score: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            output: OutputFormat::Plain,
        }
    }
}

impl GradeOptions {
    /// Engine preferences: the preferences file (or defaults) with the
    /// command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineConfig::from_json_file`] errors.
    pub fn engine_config(&self) -> Result<EngineConfig, InitializationError> {
        let mut config = match &self.config_file {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(csv) = &self.cdn_hostnames {
            config = config.with_cdn_hostnames_csv(csv);
        }
        if self.allow_negative_score {
            config.allow_negative_score = true;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert!(config.exclude_after_onload);
        assert!(config.exclude_beacons_from_lint);
        assert_eq!(config.min_future_expires_seconds, 172_800);
        assert!(!config.allow_negative_score);
        assert_eq!(config.default_ruleset_id, "ydefault");
        assert!(config.cdn_hostnames.is_empty());
    }

    #[test]
    fn test_engine_config_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"allowNegativeScore": true, "cdnHostnames": ["cdn.example.com"]}"#)
                .expect("valid preferences");
        assert!(config.allow_negative_score);
        assert_eq!(config.cdn_hostnames, vec!["cdn.example.com".to_string()]);
        // Untouched knobs keep their defaults
        assert!(config.exclude_after_onload);
        assert_eq!(config.default_ruleset_id, "ydefault");
    }

    #[test]
    fn test_cdn_hostnames_csv() {
        let config = EngineConfig::default().with_cdn_hostnames_csv("a.cdn.net, ,b.cdn.net");
        assert_eq!(config.cdn_hostnames, vec!["a.cdn.net", "b.cdn.net"]);
    }

    #[test]
    fn test_grade_options_overrides() {
        let options = GradeOptions {
            cdn_hostnames: Some("cdn.example.net".to_string()),
            allow_negative_score: true,
            ..Default::default()
        };
        let config = options.engine_config().unwrap();
        assert!(config.allow_negative_score);
        assert_eq!(config.cdn_hostnames, vec!["cdn.example.net"]);
        assert_eq!(options.output, OutputFormat::Plain);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = EngineConfig::from_json_file(Path::new("/nonexistent/prefs.json"));
        assert!(matches!(
            result,
            Err(InitializationError::ConfigReadError(_))
        ));
    }
}
