//! Engine events.
//!
//! The collection and the scorer report progress and recovered failures to an
//! [`EventSink`]. [`LogSink`] logs and counts them; [`MemorySink`] keeps them
//! for inspection.

use std::sync::{Mutex, PoisonError};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error_handling::{DiagnosticKind, DiagnosticStats};

/// Something that happened while enriching or grading a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EngineEvent {
    /// Network metadata for one component was applied.
    FetchProgress {
        /// Components registered so far
        total: usize,
        /// Components whose metadata has arrived
        received: usize,
        /// URL of the component just enriched
        last_url: String,
    },
    /// Discovery ended and every component has its metadata.
    FetchDone {
        /// Number of distinct components
        components: usize,
    },
    /// A metadata reply was dropped without a response.
    ComponentFetchError {
        /// Component URL
        url: String,
    },
    /// A discovered URL was rejected.
    InvalidResource {
        /// URL as discovered
        url: String,
    },
    /// A rule failed and was left out of the result set.
    LintError {
        /// Rule id
        rule_id: String,
        /// Failure description
        message: String,
    },
    /// The ruleset had no rule that could be evaluated.
    DegenerateRuleset {
        /// Ruleset id
        ruleset_id: String,
    },
    /// A result set is ready.
    LintResultReady {
        /// Ruleset id
        ruleset_id: String,
        /// Weighted overall score
        overall_score: f64,
    },
}

impl EngineEvent {
    /// Diagnostic counter this event feeds, if any.
    pub fn diagnostic_kind(&self) -> Option<DiagnosticKind> {
        match self {
            EngineEvent::ComponentFetchError { .. } => Some(DiagnosticKind::ComponentFetchError),
            EngineEvent::InvalidResource { .. } => Some(DiagnosticKind::InvalidResource),
            EngineEvent::LintError { .. } => Some(DiagnosticKind::LintError),
            EngineEvent::DegenerateRuleset { .. } => Some(DiagnosticKind::DegenerateRuleset),
            _ => None,
        }
    }
}

/// Receiver for engine events.
pub trait EventSink: Send + Sync {
    /// Handles one event. Must not block.
    fn emit(&self, event: &EngineEvent);
}

/// Logs every event and counts the diagnostic ones.
#[derive(Debug, Default)]
pub struct LogSink {
    stats: DiagnosticStats,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &DiagnosticStats {
        &self.stats
    }
}

impl EventSink for LogSink {
    fn emit(&self, event: &EngineEvent) {
        if let Some(kind) = event.diagnostic_kind() {
            self.stats.increment(kind);
        }
        match event {
            EngineEvent::FetchProgress {
                total,
                received,
                last_url,
            } => debug!("Enriched {} ({}/{})", last_url, received, total),
            EngineEvent::FetchDone { components } => {
                info!("All {} components enriched", components)
            }
            EngineEvent::ComponentFetchError { url } => {
                warn!("No network metadata for {}", url)
            }
            EngineEvent::InvalidResource { url } => debug!("Ignoring resource {}", url),
            EngineEvent::LintError { rule_id, message } => {
                warn!("Rule {} failed: {}", rule_id, message)
            }
            EngineEvent::DegenerateRuleset { ruleset_id } => {
                warn!("Ruleset {} has no usable rules", ruleset_id)
            }
            EngineEvent::LintResultReady {
                ruleset_id,
                overall_score,
            } => info!("Ruleset {} scored {:.1}", ruleset_id, overall_score),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EngineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far, in order.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of received events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| predicate(e))
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
