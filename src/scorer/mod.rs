//! Weighted scoring of a page against a ruleset.
//!
//! A [`Scorer`] runs every rule of one ruleset in order, clamps and weights
//! the scores and produces a [`ResultSet`]. Each scorer produces exactly one
//! result set; build a new one to grade again.

mod result;

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::collection::ComponentCollection;
use crate::config::EngineConfig;
use crate::document::PageDocument;
use crate::error_handling::ScoreError;
use crate::events::{EngineEvent, EventSink, LogSink};
use crate::registry::{RuleRegistry, Ruleset};
use crate::rules::{Rule, RuleConfig, Score};

pub use result::{Grade, ResultSet, RuleResult};

/// Lifecycle of a [`Scorer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerState {
    Idle,
    Running,
    Scored,
}

/// Grades one page.
pub struct Scorer<'a> {
    registry: &'a RuleRegistry,
    config: &'a EngineConfig,
    events: Arc<dyn EventSink>,
    state: ScorerState,
}

impl<'a> Scorer<'a> {
    /// Scorer that reports events to a [`LogSink`].
    pub fn new(registry: &'a RuleRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            events: Arc::new(LogSink::new()),
            state: ScorerState::Idle,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> ScorerState {
        self.state
    }

    /// Ruleset to apply: the requested one, else the configured default,
    /// else the registry default, else the first registered.
    fn resolve_ruleset(&self, ruleset_id: Option<&str>) -> Result<&'a Ruleset, ScoreError> {
        if let Some(id) = ruleset_id {
            return self
                .registry
                .ruleset(id)
                .ok_or_else(|| ScoreError::RulesetNotFound(id.to_string()));
        }
        self.registry
            .ruleset(&self.config.default_ruleset_id)
            .or_else(|| self.registry.default_ruleset())
            .or_else(|| self.registry.rulesets().next())
            .ok_or(ScoreError::NoRulesets)
    }

    /// Option values derived from engine preferences, layered between the
    /// rule defaults and the ruleset overrides.
    fn preference_overrides(&self, rule: &dyn Rule, defaults: &RuleConfig) -> RuleConfig {
        let mut overrides = RuleConfig::new();
        match rule.id() {
            "ycdn" if !self.config.cdn_hostnames.is_empty() => {
                let mut patterns = defaults.string_list("patterns").unwrap_or_default();
                patterns.extend(self.config.cdn_hostnames.iter().cloned());
                overrides.set("patterns", patterns);
            }
            "yexpires" if self.config.min_future_expires_seconds > 0 => {
                overrides.set(
                    "howfar",
                    Value::from(self.config.min_future_expires_seconds),
                );
            }
            _ => {}
        }
        overrides
    }

    /// Effective configuration of `rule` within `ruleset`.
    pub fn effective_config(&self, rule: &dyn Rule, ruleset: &Ruleset) -> RuleConfig {
        let defaults = rule.default_config();
        let preferences = self.preference_overrides(rule, &defaults);
        let layered = defaults.merged(&preferences);
        match ruleset.rules.get(rule.id()) {
            Some(overrides) => layered.merged(overrides),
            None => layered,
        }
    }

    /// Grades the page.
    ///
    /// Rules that fail are skipped and reported as [`EngineEvent::LintError`].
    /// Rules the registry does not know are skipped silently apart from a log
    /// line.
    ///
    /// # Errors
    ///
    /// `AlreadyScored` on a second call, `RulesetNotFound` for an unknown
    /// `ruleset_id`, `NoRulesets` when nothing is registered.
    pub fn run(
        &mut self,
        doc: &PageDocument,
        cset: &ComponentCollection,
        ruleset_id: Option<&str>,
    ) -> Result<ResultSet, ScoreError> {
        if self.state != ScorerState::Idle {
            return Err(ScoreError::AlreadyScored);
        }
        let ruleset = self.resolve_ruleset(ruleset_id)?;
        self.state = ScorerState::Running;
        info!("Applying ruleset {} ({})", ruleset.id, ruleset.name);

        let mut results = Vec::with_capacity(ruleset.rules.len());
        let mut total_score: i64 = 0;
        let mut total_weight: i64 = 0;

        for rule_id in ruleset.rules.keys() {
            let Some(rule) = self.registry.rule(rule_id) else {
                warn!("Skipping unknown rule {} in ruleset {}", rule_id, ruleset.id);
                continue;
            };
            let config = self.effective_config(rule.as_ref(), ruleset);
            let outcome = match rule.lint(doc, cset, &config) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.events.emit(&EngineEvent::LintError {
                        rule_id: rule_id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let weight = self.registry.effective_weight(ruleset, rule_id);
            let score = match outcome.score {
                Score::Points(points) => {
                    let points = if points < 0 && !self.config.allow_negative_score {
                        0
                    } else {
                        points
                    };
                    total_weight += i64::from(weight);
                    if points != 0 {
                        total_score += points * i64::from(weight);
                    }
                    Score::Points(points)
                }
                Score::NotApplicable => Score::NotApplicable,
            };
            debug!("Rule {} scored {:?} (weight {})", rule_id, score, weight);

            results.push(RuleResult {
                rule_id: rule_id.clone(),
                name: rule.name().to_string(),
                category: rule.category().to_vec(),
                score,
                message: outcome.message,
                offenders: outcome.offenders,
                weight,
            });
        }

        if results.is_empty() {
            self.events.emit(&EngineEvent::DegenerateRuleset {
                ruleset_id: ruleset.id.clone(),
            });
        }
        let overall_score = total_score as f64 / total_weight.max(1) as f64;

        self.state = ScorerState::Scored;
        self.events.emit(&EngineEvent::LintResultReady {
            ruleset_id: ruleset.id.clone(),
            overall_score,
        });
        Ok(ResultSet::new(
            results,
            overall_score,
            ruleset.id.clone(),
            doc.url.clone(),
        ))
    }
}

impl std::fmt::Debug for Scorer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer").field("state", &self.state).finish()
    }
}
