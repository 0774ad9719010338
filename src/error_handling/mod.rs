//! Error handling and diagnostic statistics.
//!
//! This module provides:
//! - Error enums for initialization, capture loading, registration, linting
//!   and scoring
//! - Diagnostic counters for conditions that are recovered from
//!
//! Only registry and scorer failures reach the caller as `Err`. Rejected URLs,
//! missing network metadata and failing rules are logged, emitted as events
//! and counted.

mod stats;
mod types;

pub use stats::DiagnosticStats;
pub use types::{
    CaptureError, DiagnosticKind, InitializationError, LintError, RegistryError, ScoreError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_diagnostic_stats_initialization() {
        let stats = DiagnosticStats::new();
        for kind in DiagnosticKind::iter() {
            assert_eq!(stats.count(kind), 0);
        }
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_diagnostic_stats_increment() {
        let stats = DiagnosticStats::new();
        stats.increment(DiagnosticKind::LintError);
        stats.increment(DiagnosticKind::LintError);
        stats.increment(DiagnosticKind::InvalidResource);

        assert_eq!(stats.count(DiagnosticKind::LintError), 2);
        assert_eq!(stats.count(DiagnosticKind::InvalidResource), 1);
        assert_eq!(stats.count(DiagnosticKind::DegenerateRuleset), 0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_registry_error_messages() {
        let err = RegistryError::DuplicateRegistration {
            kind: "rule",
            id: "ynumreq".to_string(),
        };
        assert_eq!(err.to_string(), "rule register error: ynumreq is already defined");

        let err = RegistryError::Interface {
            kind: "ruleset",
            missing: "name",
        };
        assert!(err.to_string().contains("ruleset interface"));
    }

    #[test]
    fn test_diagnostic_kind_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            DiagnosticKind::iter().map(|k| k.as_str()).collect();
        assert_eq!(labels.len(), DiagnosticKind::iter().count());
    }
}
