//! Performance rules.
//!
//! A rule inspects a page (its [`PageDocument`] and [`ComponentCollection`])
//! under an effective [`RuleConfig`] and reports a score, a message and the
//! offending components. The built-in rules are listed by [`builtin_rules`].

mod builtin;
mod config;
pub mod text;

use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::collection::ComponentCollection;
use crate::component::{Component, ComponentId};
use crate::config::NOT_APPLICABLE_SCORE;
use crate::document::PageDocument;
use crate::error_handling::LintError;

pub use builtin::builtin_rules;
pub(crate) use config::int_value;
pub use config::RuleConfig;

/// Rule category tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Content,
    Server,
    Css,
    Javascript,
    Cookie,
    Images,
}

/// Rule score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Points(i64),
    /// Informational rule; contributes neither score nor weight
    NotApplicable,
}

impl Score {
    /// Numeric view, `-1` for not applicable.
    pub fn as_number(&self) -> i64 {
        match self {
            Score::Points(points) => *points,
            Score::NotApplicable => NOT_APPLICABLE_SCORE,
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Points(points) => serializer.serialize_i64(*points),
            Score::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}

/// Something a rule complains about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Offender {
    Component { id: ComponentId, url: String },
    Text(String),
}

impl Offender {
    pub fn component(component: &Component) -> Self {
        Offender::Component {
            id: component.id,
            url: component.url.clone(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Offender::Text(text.into())
    }
}

/// What one rule reports for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOutcome {
    pub score: Score,
    /// Empty when the page passes
    pub message: String,
    pub offenders: Vec<Offender>,
}

impl LintOutcome {
    /// Score-only outcome with no offenders.
    pub fn points(score: i64, message: impl Into<String>) -> Self {
        Self {
            score: Score::Points(score),
            message: message.into(),
            offenders: Vec::new(),
        }
    }

    /// `100 - offenders * points`, with `template` pluralized for the
    /// offender count, or an empty message when there are none.
    pub(crate) fn per_offender(offenders: Vec<Offender>, points: i64, template: &str) -> Self {
        let count = offenders.len();
        let message = if count > 0 {
            text::plural(template, count)
        } else {
            String::new()
        };
        Self {
            score: Score::Points(100 - count as i64 * points),
            message,
            offenders,
        }
    }
}

/// A performance rule.
///
/// Implementations must be pure: the outcome depends only on the arguments.
pub trait Rule: Send + Sync {
    /// Unique identifier
    fn id(&self) -> &str;
    /// Human readable name
    fn name(&self) -> &str;
    /// Short description
    fn info(&self) -> &str;
    /// Where to read more
    fn info_url(&self) -> &str;
    fn category(&self) -> &[Category];
    /// Option defaults, overridden key by key by preferences and rulesets
    fn default_config(&self) -> RuleConfig;

    /// Evaluates the page.
    ///
    /// # Errors
    ///
    /// Returns a [`LintError`] when the configuration is unusable.
    fn lint(
        &self,
        doc: &PageDocument,
        cset: &ComponentCollection,
        config: &RuleConfig,
    ) -> Result<LintOutcome, LintError>;
}

type LintFn = fn(&PageDocument, &ComponentCollection, &RuleConfig) -> Result<LintOutcome, LintError>;

/// A rule made of static metadata and a lint function.
pub struct BuiltinRule {
    pub id: &'static str,
    pub name: &'static str,
    pub info: &'static str,
    pub info_url: &'static str,
    pub category: &'static [Category],
    pub defaults: fn() -> RuleConfig,
    pub lint: LintFn,
}

impl Rule for BuiltinRule {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn info(&self) -> &str {
        self.info
    }

    fn info_url(&self) -> &str {
        self.info_url
    }

    fn category(&self) -> &[Category] {
        self.category
    }

    fn default_config(&self) -> RuleConfig {
        (self.defaults)()
    }

    fn lint(
        &self,
        doc: &PageDocument,
        cset: &ComponentCollection,
        config: &RuleConfig,
    ) -> Result<LintOutcome, LintError> {
        (self.lint)(doc, cset, config)
    }
}

impl std::fmt::Debug for BuiltinRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinRule").field("id", &self.id).finish()
    }
}
