//! Report rendering for the command line.

use colored::*;
use serde::Serialize;

use crate::scorer::{Grade, ResultSet, RuleResult};
use crate::stats::PageStats;

/// Everything one grading run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub result: ResultSet,
    pub grade: Grade,
    pub empty_cache: PageStats,
    pub primed_cache: PageStats,
}

impl GradeReport {
    pub fn new(result: ResultSet, empty_cache: PageStats, primed_cache: PageStats) -> Self {
        Self {
            grade: result.grade(),
            result,
            empty_cache,
            primed_cache,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the report itself always serializes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable grade card.
    pub fn to_plain(&self) -> String {
        let mut out = format!(
            "Grade {} ({:.0}) for {} [ruleset {}]\n\n",
            paint(self.grade),
            self.result.overall_score(),
            self.result.page_url(),
            self.result.ruleset_applied()
        );
        for result in self.result.results() {
            out.push_str(&rule_line(result));
        }
        out.push('\n');
        out.push_str(&stats_line("Empty cache", &self.empty_cache));
        out.push_str(&stats_line("Primed cache", &self.primed_cache));
        out
    }
}

fn paint(grade: Grade) -> ColoredString {
    let label = grade.to_string();
    match grade {
        Grade::A | Grade::B => label.green().bold(),
        Grade::C | Grade::D => label.yellow().bold(),
        Grade::E | Grade::F => label.red().bold(),
        Grade::NotApplicable => label.dimmed(),
    }
}

fn rule_line(result: &RuleResult) -> String {
    let mut line = format!(
        "  {}  {} ({})\n",
        paint(result.grade()),
        result.name,
        result.rule_id.cyan()
    );
    for message_line in result.message.lines().filter(|l| !l.trim().is_empty()) {
        line.push_str(&format!("        {}\n", message_line.trim()));
    }
    line
}

fn stats_line(label: &str, stats: &PageStats) -> String {
    format!(
        "{}: {} request{}, {} bytes\n",
        label,
        stats.num_requests,
        if stats.num_requests == 1 { "" } else { "s" },
        stats.total_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, Score};

    fn report() -> GradeReport {
        let result = ResultSet::new(
            vec![RuleResult {
                rule_id: "ynumreq".to_string(),
                name: "Make fewer HTTP requests".to_string(),
                category: vec![Category::Content],
                score: Score::Points(92),
                message: "This page has 5 external Javascript scripts.  Try combining them into one.".to_string(),
                offenders: Vec::new(),
                weight: 8,
            }],
            92.0,
            "ydefault".to_string(),
            "http://ex.com/".to_string(),
        );
        let empty = PageStats {
            num_requests: 6,
            total_size: 1200,
            ..Default::default()
        };
        let primed = PageStats {
            primed_cache: true,
            num_requests: 1,
            total_size: 300,
            ..Default::default()
        };
        GradeReport::new(result, empty, primed)
    }

    #[test]
    fn test_plain_report() {
        let text = report().to_plain();
        assert!(text.contains("(92) for http://ex.com/"));
        assert!(text.contains("Make fewer HTTP requests"));
        assert!(text.contains("This page has 5 external Javascript scripts."));
        assert!(text.contains("Empty cache: 6 requests, 1200 bytes"));
        assert!(text.contains("Primed cache: 1 request, 300 bytes"));
    }

    #[test]
    fn test_json_report() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["grade"], "A");
        assert_eq!(json["result"]["overallScore"], 92.0);
        assert_eq!(json["result"]["results"][0]["score"], 92);
        assert_eq!(json["emptyCache"]["numRequests"], 6);
        assert_eq!(json["primedCache"]["primedCache"], true);
    }
}
