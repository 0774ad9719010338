//! Rule configuration values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::component::ComponentType;
use crate::document::InlineTag;
use crate::error_handling::LintError;

/// Option name to JSON value map for one rule.
///
/// Effective configuration is layered: the rule's defaults, then
/// preference-derived tweaks, then the ruleset's overrides, later layers
/// replacing earlier ones key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig(Map<String, Value>);

impl RuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from a JSON object; any other value gives an empty config.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: keys of `overrides` replace keys of `self`.
    pub fn merged(&self, overrides: &RuleConfig) -> RuleConfig {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        RuleConfig(merged)
    }

    fn require(&self, key: &str) -> Result<&Value, LintError> {
        self.0
            .get(key)
            .ok_or_else(|| LintError::MissingOption(key.to_string()))
    }

    /// Integer option. Numeric strings are accepted by their leading digits.
    ///
    /// # Errors
    ///
    /// `MissingOption` when absent, `MalformedOption` when not a number.
    pub fn int(&self, key: &str) -> Result<i64, LintError> {
        let malformed = || LintError::MalformedOption {
            option: key.to_string(),
            expected: "an integer",
        };
        int_value(self.require(key)?).ok_or_else(malformed)
    }

    /// List of strings. A single string is a one-element list.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, LintError> {
        let malformed = || LintError::MalformedOption {
            option: key.to_string(),
            expected: "a list of strings",
        };
        match self.require(key)? {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(malformed))
                .collect(),
            _ => Err(malformed()),
        }
    }

    /// List of component kinds.
    pub fn types(&self, key: &str) -> Result<Vec<ComponentType>, LintError> {
        self.string_list(key)?
            .iter()
            .map(|name| {
                ComponentType::from_str(name).map_err(|_| LintError::MalformedOption {
                    option: key.to_string(),
                    expected: "component type names",
                })
            })
            .collect()
    }

    /// Inline tags to inspect. `false`, `null` or a missing key mean none.
    pub fn inline_tags(&self, key: &str) -> Result<Vec<InlineTag>, LintError> {
        match self.0.get(key) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(Vec::new()),
            Some(_) => self
                .string_list(key)?
                .iter()
                .map(|name| {
                    InlineTag::from_str(name).map_err(|_| LintError::MalformedOption {
                        option: key.to_string(),
                        expected: "\"style\" or \"script\"",
                    })
                })
                .collect(),
        }
    }
}

impl From<Value> for RuleConfig {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Integer view of a JSON value: numbers truncate, strings parse their
/// leading digits.
pub(crate) fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Integer prefix of a string, skipping leading whitespace and an optional sign.
pub(crate) fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_is_shallow_and_later_wins() {
        let defaults = RuleConfig::from_value(json!({"points": 10, "types": ["js", "css"]}));
        let overrides = RuleConfig::from_value(json!({"types": ["js"]}));
        let merged = defaults.merged(&overrides);
        assert_eq!(merged.int("points"), Ok(10));
        assert_eq!(merged.types("types"), Ok(vec![ComponentType::Js]));
    }

    #[test]
    fn test_int_accepts_numeric_strings() {
        let config = RuleConfig::new().with("points", "11px").with("bad", "x");
        assert_eq!(config.int("points"), Ok(11));
        assert!(matches!(config.int("bad"), Err(LintError::MalformedOption { .. })));
        assert_eq!(
            config.int("missing"),
            Err(LintError::MissingOption("missing".to_string()))
        );
    }

    #[test]
    fn test_types_reject_unknown_names() {
        let config = RuleConfig::from_value(json!({"types": ["js", "stylesheet"]}));
        assert!(config.types("types").is_err());
    }

    #[test]
    fn test_inline_tags_false_means_none() {
        let config = RuleConfig::from_value(json!({"check_inline": false}));
        assert_eq!(config.inline_tags("check_inline"), Ok(vec![]));
        let config = RuleConfig::from_value(json!({"check_inline": ["style", "script"]}));
        assert_eq!(
            config.inline_tags("check_inline"),
            Ok(vec![InlineTag::Style, InlineTag::Script])
        );
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int(" 42abc"), Some(42));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("abc"), None);
    }
}
