//! Diagnostic statistics tracking.
//!
//! Thread-safe counters for the conditions that are recovered from during
//! grading (missing metadata, rejected URLs, failing rules).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::DiagnosticKind;

/// Thread-safe diagnostic counter.
///
/// All kinds are initialized to zero on creation, so the struct can be shared
/// through an `Arc` and incremented from the enrichment task and the scorer.
pub struct DiagnosticStats {
    counts: HashMap<DiagnosticKind, AtomicUsize>,
}

impl DiagnosticStats {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for kind in DiagnosticKind::iter() {
            counts.insert(kind, AtomicUsize::new(0));
        }
        DiagnosticStats { counts }
    }

    /// Increment a diagnostic counter.
    pub fn increment(&self, kind: DiagnosticKind) {
        if let Some(counter) = self.counts.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment diagnostic counter for {:?} which is not in the map. \
                 This indicates a bug in DiagnosticStats initialization.",
                kind
            );
        }
    }

    /// Get the count for a diagnostic kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total of all counters.
    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self) {
        for kind in DiagnosticKind::iter() {
            let count = self.count(kind);
            if count > 0 {
                log::info!("{}: {}", kind.as_str(), count);
            }
        }
    }
}

impl Default for DiagnosticStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in DiagnosticKind::iter() {
            map.entry(&kind, &self.count(kind));
        }
        map.finish()
    }
}
