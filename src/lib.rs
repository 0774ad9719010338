//! pagegrade library: rule-based web page performance grading
//!
//! This library grades the components of one page load (documents, scripts,
//! stylesheets, images and so on, with the HTTP metadata recorded for each)
//! against weighted rulesets of performance rules, producing per-rule scores,
//! offenders and an overall grade.
//!
//! # Example
//!
//! ```no_run
//! use pagegrade::{GradeOptions, run_grade};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = GradeOptions {
//!     capture: PathBuf::from("capture.json"),
//!     ..Default::default()
//! };
//!
//! let report = run_grade(&options).await?;
//! println!("Grade {} ({:.0})", report.grade, report.result.overall_score());
//! # Ok(())
//! # }
//! ```
//!
//! Lower-level use goes through [`ComponentCollection`], [`RuleRegistry`] and
//! [`Scorer`] directly.
//!
//! # Requirements
//!
//! Waiting for network metadata uses a Tokio channel. Use `#[tokio::main]` in
//! your application or drive [`ComponentCollection::pump`] yourself.

pub mod capture;
pub mod collection;
pub mod component;
pub mod config;
pub mod document;
pub mod error_handling;
pub mod events;
pub mod initialization;
pub mod registry;
pub mod report;
pub mod rules;
pub mod scorer;
pub mod stats;
mod utils;

// Re-export public API
pub use capture::{CapturedComponent, LoadedPage, PageCapture};
pub use collection::{ComponentCollection, LintFilters};
pub use component::{Component, ComponentType, NetInfoFetcher, NetResponse, StaticFetcher};
pub use config::{Cli, EngineConfig, GradeOptions, LogFormat, LogLevel, OutputFormat};
pub use document::PageDocument;
pub use error_handling::{CaptureError, LintError, RegistryError, ScoreError};
pub use events::{EngineEvent, EventSink, LogSink, MemorySink};
pub use registry::{RuleRegistry, Ruleset};
pub use report::GradeReport;
pub use rules::text::plural;
pub use rules::{Category, LintOutcome, Offender, Rule, RuleConfig, Score};
pub use run::run_grade;
pub use scorer::{Grade, ResultSet, RuleResult, Scorer};
pub use stats::PageStats;

// Internal run module (loads, grades and summarizes one capture)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use strum::IntoEnumIterator;

    use crate::capture::PageCapture;
    use crate::config::GradeOptions;
    use crate::error_handling::{DiagnosticKind, DiagnosticStats};
    use crate::events::LogSink;
    use crate::registry::RuleRegistry;
    use crate::report::GradeReport;
    use crate::scorer::Scorer;
    use crate::stats::PageStats;

    /// Grades one captured page.
    ///
    /// This is the main entry point for the library. It reads the engine
    /// preferences and any custom rulesets, replays the capture, applies the
    /// requested (or default) ruleset and computes empty and primed cache
    /// statistics.
    ///
    /// # Arguments
    ///
    /// * `options` - Capture path, ruleset choice and preference overrides
    ///
    /// # Returns
    ///
    /// A [`GradeReport`] with the result set and page statistics.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The preferences, custom rulesets or capture cannot be read or parsed
    /// - A custom ruleset collides with a registered one
    /// - The requested ruleset is not registered
    pub async fn run_grade(options: &GradeOptions) -> Result<GradeReport> {
        let config = options
            .engine_config()
            .context("Failed to load engine preferences")?;

        let mut registry = RuleRegistry::with_builtins();
        if let Some(path) = &options.custom_rulesets {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read custom rulesets from {}", path.display()))?;
            let loaded = registry
                .load_custom_rulesets_json(&raw)
                .context("Failed to load custom rulesets")?;
            info!(
                "Loaded {} custom ruleset{}",
                loaded,
                if loaded == 1 { "" } else { "s" }
            );
        }

        let capture = PageCapture::from_file(&options.capture)
            .with_context(|| format!("Failed to load capture {}", options.capture.display()))?;

        let events = Arc::new(LogSink::new());
        let page = capture.load(&config, events.clone()).await;
        let result = Scorer::new(&registry, &config)
            .with_events(events.clone())
            .run(
                &page.document,
                &page.components,
                options.ruleset.as_deref(),
            )
            .context("Failed to grade page")?;

        log_diagnostics(events.stats());
        Ok(GradeReport::new(
            result,
            PageStats::compute(&page.components, false, &config),
            PageStats::compute(&page.components, true, &config),
        ))
    }

    fn log_diagnostics(stats: &DiagnosticStats) {
        if stats.total() == 0 {
            return;
        }
        warn!("{} recoverable problem(s) while grading", stats.total());
        for kind in DiagnosticKind::iter() {
            let count = stats.count(kind);
            if count > 0 {
                warn!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}
