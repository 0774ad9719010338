//! Engine configuration and constants.
//!
//! This module provides:
//! - Engine constants (default weights, thresholds, ignored schemes)
//! - HTTP header name constants
//! - Preference, grading and logging option types
//! - Command-line options

mod cli;
mod constants;
mod headers;
mod types;

pub use constants::*;
pub use headers::*;
pub use cli::Cli;
pub use types::{EngineConfig, GradeOptions, LogFormat, LogLevel, OutputFormat};
