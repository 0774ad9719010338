//! Scoring results.

use serde::Serialize;
use strum_macros::{Display, EnumIter};

use crate::config::NOT_APPLICABLE_SCORE;
use crate::rules::{Category, Offender, Score};

/// Letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
    #[strum(serialize = "N/A")]
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Grade {
    /// A from 90, B from 80, C from 70, D from 60, E from 50, F below.
    /// The not-applicable score (-1) has no grade.
    pub fn from_score(score: f64) -> Self {
        if score == NOT_APPLICABLE_SCORE as f64 {
            Grade::NotApplicable
        } else if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else if score >= 50.0 {
            Grade::E
        } else {
            Grade::F
        }
    }
}

/// Outcome of one rule within a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_id: String,
    pub name: String,
    pub category: Vec<Category>,
    /// After clamping
    pub score: Score,
    pub message: String,
    pub offenders: Vec<Offender>,
    pub weight: u32,
}

impl RuleResult {
    pub fn grade(&self) -> Grade {
        match self.score {
            Score::Points(points) => Grade::from_score(points as f64),
            Score::NotApplicable => Grade::NotApplicable,
        }
    }
}

/// Immutable outcome of grading one page against one ruleset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    results: Vec<RuleResult>,
    overall_score: f64,
    ruleset_applied: String,
    page_url: String,
}

impl ResultSet {
    pub(crate) fn new(
        results: Vec<RuleResult>,
        overall_score: f64,
        ruleset_applied: String,
        page_url: String,
    ) -> Self {
        Self {
            results,
            overall_score,
            ruleset_applied,
            page_url,
        }
    }

    /// Per-rule results in ruleset order.
    pub fn results(&self) -> &[RuleResult] {
        &self.results
    }

    /// Result for one rule, if it was evaluated.
    pub fn result(&self, rule_id: &str) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.rule_id == rule_id)
    }

    /// Weighted mean of the rule scores.
    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn ruleset_applied(&self) -> &str {
        &self.ruleset_applied
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Grade of the overall score.
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.overall_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100.0), Grade::A);
        assert_eq!(Grade::from_score(90.0), Grade::A);
        assert_eq!(Grade::from_score(89.99), Grade::B);
        assert_eq!(Grade::from_score(70.0), Grade::C);
        assert_eq!(Grade::from_score(60.0), Grade::D);
        assert_eq!(Grade::from_score(50.0), Grade::E);
        assert_eq!(Grade::from_score(0.0), Grade::F);
        assert_eq!(Grade::from_score(-1.0), Grade::NotApplicable);
        assert_eq!(Grade::NotApplicable.to_string(), "N/A");
    }

    #[test]
    fn test_result_set_serializes_camel_case() {
        let set = ResultSet::new(
            vec![RuleResult {
                rule_id: "yexternal".to_string(),
                name: "Make JS and CSS external".to_string(),
                category: vec![Category::Javascript, Category::Css],
                score: Score::NotApplicable,
                message: String::new(),
                offenders: Vec::new(),
                weight: 4,
            }],
            0.0,
            "ydefault".to_string(),
            "http://ex.com/".to_string(),
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["rulesetApplied"], "ydefault");
        assert_eq!(json["results"][0]["ruleId"], "yexternal");
        assert_eq!(json["results"][0]["score"], "n/a");
        assert_eq!(json["results"][0]["category"][1], "css");
        assert_eq!(set.results()[0].grade(), Grade::NotApplicable);
        assert!(set.result("ynumreq").is_none());
    }
}
