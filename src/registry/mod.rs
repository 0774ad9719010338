//! Rule and ruleset registry.
//!
//! The registry owns every known [`Rule`] and every [`Ruleset`]. Built-ins are
//! added by [`RuleRegistry::with_builtins`]; user rulesets arrive as JSON via
//! [`RuleRegistry::load_custom_rulesets_json`] and are the only ones that can
//! be removed.

mod builtin;

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, error, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{DEFAULT_RULESET_ID, DEFAULT_RULE_WEIGHT, MAX_RULE_WEIGHT};
use crate::error_handling::{RegistryError, ScoreError};
use crate::rules::{builtin_rules, int_value, Rule, RuleConfig};

/// A named, weighted bundle of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Enabled rules in evaluation order, with config overrides
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub rules: IndexMap<String, RuleConfig>,
    /// Rule weights, nominally 0 to 100
    #[serde(default, deserialize_with = "deserialize_weights")]
    pub weights: IndexMap<String, i64>,
    /// Loaded from user data rather than shipped
    #[serde(default, skip_serializing)]
    pub custom: bool,
}

impl Ruleset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rules: IndexMap::new(),
            weights: IndexMap::new(),
            custom: false,
        }
    }

    /// Enables `rule_id` with `overrides`, keeping its position if already enabled.
    pub fn rule(mut self, rule_id: impl Into<String>, overrides: RuleConfig) -> Self {
        self.rules.insert(rule_id.into(), overrides);
        self
    }

    pub fn weight(mut self, rule_id: impl Into<String>, weight: i64) -> Self {
        self.weights.insert(rule_id.into(), weight);
        self
    }
}

/// A rule entry may be an override object or a flag. `false`, `0`, `""` and
/// `null` disable the rule; any other non-object enables it without overrides.
fn deserialize_rules<'de, D>(deserializer: D) -> Result<IndexMap<String, RuleConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(rule_id, value)| {
            let enabled = match &value {
                Value::Null => false,
                Value::Bool(flag) => *flag,
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                Value::String(text) => !text.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            };
            if !enabled {
                debug!("Rule {} disabled by its ruleset entry", rule_id);
                return None;
            }
            Some((rule_id, RuleConfig::from_value(value)))
        })
        .collect())
}

/// Weights may be numbers or numeric strings; anything else is dropped and
/// falls back to the default weight.
fn deserialize_weights<'de, D>(deserializer: D) -> Result<IndexMap<String, i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(rule_id, value)| match int_value(&value) {
            Some(weight) => Some((rule_id, weight)),
            None => {
                warn!("Ignoring non-numeric weight for {}: {}", rule_id, value);
                None
            }
        })
        .collect())
}

/// All known rules and rulesets.
pub struct RuleRegistry {
    rules: IndexMap<String, Arc<dyn Rule>>,
    rulesets: IndexMap<String, Ruleset>,
    default_ruleset_id: String,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            rulesets: IndexMap::new(),
            default_ruleset_id: DEFAULT_RULESET_ID.to_string(),
        }
    }

    /// Registry holding the built-in rules and rulesets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            if let Err(e) = registry.register_rule(rule) {
                error!("{}", e);
            }
        }
        for ruleset in builtin::builtin_rulesets() {
            if let Err(e) = registry.register_ruleset(ruleset, false) {
                error!("{}", e);
            }
        }
        registry
    }

    /// Adds a rule.
    ///
    /// # Errors
    ///
    /// `Interface` when the id, name or info URL is empty;
    /// `DuplicateRegistration` when the id is taken.
    pub fn register_rule(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let missing = if rule.id().is_empty() {
            Some("id")
        } else if rule.name().is_empty() {
            Some("name")
        } else if rule.info_url().is_empty() {
            Some("url")
        } else {
            None
        };
        if let Some(missing) = missing {
            return Err(RegistryError::Interface {
                kind: "rule",
                missing,
            });
        }
        if self.rules.contains_key(rule.id()) {
            return Err(RegistryError::DuplicateRegistration {
                kind: "rule",
                id: rule.id().to_string(),
            });
        }
        debug!("Registered rule {}", rule.id());
        self.rules.insert(rule.id().to_string(), rule);
        Ok(())
    }

    /// Adds a ruleset, or replaces one with the same id when `update` is set.
    ///
    /// Ids and names must be unique ignoring ASCII case. Rule ids the registry
    /// does not know are kept; they are skipped when scoring.
    ///
    /// # Errors
    ///
    /// `Interface` when the id or name is empty; `DuplicateRegistration` on a
    /// collision without `update`.
    pub fn register_ruleset(&mut self, ruleset: Ruleset, update: bool) -> Result<(), RegistryError> {
        if ruleset.id.is_empty() {
            return Err(RegistryError::Interface {
                kind: "ruleset",
                missing: "id",
            });
        }
        if ruleset.name.is_empty() {
            return Err(RegistryError::Interface {
                kind: "ruleset",
                missing: "name",
            });
        }

        let colliding = self.rulesets.values().find(|existing| {
            existing.id.eq_ignore_ascii_case(&ruleset.id)
                || existing.name.eq_ignore_ascii_case(&ruleset.name)
        });
        if let Some(existing) = colliding {
            if !update {
                return Err(RegistryError::DuplicateRegistration {
                    kind: "ruleset",
                    id: ruleset.id.clone(),
                });
            }
            let existing_id = existing.id.clone();
            self.rulesets.shift_remove(&existing_id);
        }

        for rule_id in ruleset.rules.keys() {
            if !self.rules.contains_key(rule_id) {
                warn!("Ruleset {} enables unknown rule {}", ruleset.id, rule_id);
            }
        }
        debug!("Registered ruleset {} ({})", ruleset.id, ruleset.name);
        self.rulesets.insert(ruleset.id.clone(), ruleset);
        Ok(())
    }

    /// Removes a custom ruleset.
    ///
    /// Built-in rulesets are never removed. Removing the default ruleset makes
    /// the built-in default the default again.
    pub fn remove_ruleset(&mut self, id: &str) -> Option<Ruleset> {
        match self.rulesets.get(id) {
            Some(ruleset) if ruleset.custom => {}
            Some(_) => {
                warn!("Refusing to remove built-in ruleset {}", id);
                return None;
            }
            None => return None,
        }
        let removed = self.rulesets.shift_remove(id);
        if self.default_ruleset_id == id {
            self.default_ruleset_id = DEFAULT_RULESET_ID.to_string();
        }
        removed
    }

    /// Selects the ruleset used when none is requested.
    ///
    /// # Errors
    ///
    /// `RulesetNotFound` when `id` is not registered.
    pub fn set_default_ruleset(&mut self, id: &str) -> Result<(), ScoreError> {
        if !self.rulesets.contains_key(id) {
            return Err(ScoreError::RulesetNotFound(id.to_string()));
        }
        self.default_ruleset_id = id.to_string();
        Ok(())
    }

    pub fn default_ruleset_id(&self) -> &str {
        &self.default_ruleset_id
    }

    /// The default ruleset, if registered.
    pub fn default_ruleset(&self) -> Option<&Ruleset> {
        self.rulesets.get(&self.default_ruleset_id)
    }

    pub fn ruleset(&self, id: &str) -> Option<&Ruleset> {
        self.rulesets.get(id)
    }

    pub fn rule(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    /// Rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    /// Rulesets in registration order.
    pub fn rulesets(&self) -> impl Iterator<Item = &Ruleset> {
        self.rulesets.values()
    }

    /// Registers user rulesets from JSON: an array of rulesets or a single one.
    ///
    /// Every entry is marked custom. Nothing is registered if the document
    /// does not parse.
    ///
    /// # Returns
    ///
    /// The number of rulesets registered.
    ///
    /// # Errors
    ///
    /// `InvalidRulesetJson` for malformed input, or the first registration
    /// error. Rulesets before the failing one stay registered.
    pub fn load_custom_rulesets_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| RegistryError::InvalidRulesetJson(e.to_string()))?;
        let entries = match value {
            Value::Array(items) => items,
            single @ Value::Object(_) => vec![single],
            other => {
                return Err(RegistryError::InvalidRulesetJson(format!(
                    "expected an object or an array, found {}",
                    other
                )))
            }
        };
        let rulesets = entries
            .into_iter()
            .map(|entry| {
                serde_json::from_value::<Ruleset>(entry)
                    .map_err(|e| RegistryError::InvalidRulesetJson(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = rulesets.len();
        for mut ruleset in rulesets {
            ruleset.custom = true;
            self.register_ruleset(ruleset, false)?;
        }
        Ok(count)
    }

    /// Custom rulesets as a JSON array, in the shape
    /// [`RuleRegistry::load_custom_rulesets_json`] accepts.
    pub fn custom_rulesets_json(&self) -> Result<String, serde_json::Error> {
        let custom: Vec<&Ruleset> = self.rulesets.values().filter(|r| r.custom).collect();
        serde_json::to_string_pretty(&custom)
    }

    /// Weight of `rule_id` within `ruleset`.
    ///
    /// Uses the ruleset's weight when it lies in 0..=100, else the built-in
    /// default ruleset's non-zero weight, else 5.
    pub fn effective_weight(&self, ruleset: &Ruleset, rule_id: &str) -> u32 {
        let in_range = |w: &i64| (0..=i64::from(MAX_RULE_WEIGHT)).contains(w);
        if let Some(weight) = ruleset.weights.get(rule_id).filter(|w| in_range(w)) {
            return *weight as u32;
        }
        self.rulesets
            .get(DEFAULT_RULESET_ID)
            .and_then(|defaults| defaults.weights.get(rule_id))
            .filter(|w| **w != 0 && in_range(w))
            .map_or(DEFAULT_RULE_WEIGHT, |w| *w as u32)
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("rulesets", &self.rulesets.keys().collect::<Vec<_>>())
            .field("default_ruleset_id", &self.default_ruleset_id)
            .finish()
    }
}
