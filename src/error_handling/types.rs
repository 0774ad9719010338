//! Error type definitions.
//!
//! This module defines the library error enums and the diagnostic kinds that
//! are counted (rather than raised) while a page is being graded.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error reading a preferences file.
    #[error("Configuration read error: {0}")]
    ConfigReadError(#[from] std::io::Error),

    /// Error parsing a preferences file.
    #[error("Configuration parse error: {0}")]
    ConfigParseError(#[from] serde_json::Error),
}

/// Errors raised while registering rules and rulesets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A rule or ruleset is missing a required attribute.
    #[error("Interface error: improperly implemented {kind} interface ({missing} is missing)")]
    Interface {
        /// `"rule"` or `"ruleset"`
        kind: &'static str,
        /// Name of the missing attribute
        missing: &'static str,
    },

    /// The id (or, for rulesets, the name) is already taken.
    #[error("{kind} register error: {id} is already defined")]
    DuplicateRegistration {
        /// `"rule"` or `"ruleset"`
        kind: &'static str,
        /// The colliding id or name
        id: String,
    },

    /// A custom ruleset document could not be read.
    #[error("Invalid ruleset definition: {0}")]
    InvalidRulesetJson(String),
}

/// Errors a rule may return from `lint`.
///
/// The scorer recovers from these: the rule is skipped and the failure is
/// reported as an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LintError {
    /// A required config option is absent.
    #[error("config option '{0}' is missing")]
    MissingOption(String),

    /// A config option has the wrong shape.
    #[error("config option '{option}' is malformed: expected {expected}")]
    MalformedOption {
        /// Option name
        option: String,
        /// Expected JSON shape
        expected: &'static str,
    },

    /// A configured pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Offending pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

/// Errors reading a captured page.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture file could not be read.
    #[error("Capture read error: {0}")]
    Read(#[from] std::io::Error),

    /// The capture is not valid JSON or has the wrong shape.
    #[error("Capture parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The capture does not name the page URL.
    #[error("Capture has no page url")]
    MissingUrl,
}

/// Errors returned by the scorer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// The requested ruleset id is not registered.
    #[error("Ruleset '{0}' is not registered")]
    RulesetNotFound(String),

    /// The registry holds no rulesets at all.
    #[error("No ruleset is registered")]
    NoRulesets,

    /// The scorer already produced its result set.
    #[error("Scorer already produced a result set")]
    AlreadyScored,
}

/// Conditions that are recorded during grading without aborting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum DiagnosticKind {
    /// Network metadata never arrived for a component
    ComponentFetchError,
    /// A discovered URL was rejected (ignored scheme, missing host)
    InvalidResource,
    /// A rule failed and was skipped
    LintError,
    /// A ruleset had no usable rules
    DegenerateRuleset,
}

impl DiagnosticKind {
    /// Returns a human-readable string representation of the diagnostic kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ComponentFetchError => "Component fetch error",
            DiagnosticKind::InvalidResource => "Invalid resource",
            DiagnosticKind::LintError => "Lint error",
            DiagnosticKind::DegenerateRuleset => "Degenerate ruleset",
        }
    }
}
