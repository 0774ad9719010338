//! Built-in rulesets.

use super::Ruleset;
use crate::rules::RuleConfig;
use serde_json::json;

/// `(rule id, weight)` in evaluation order.
const YDEFAULT: [(&str, i64); 23] = [
    ("ynumreq", 8),
    ("ycdn", 6),
    ("yemptysrc", 30),
    ("yexpires", 10),
    ("ycompress", 8),
    ("ycsstop", 4),
    ("yjsbottom", 4),
    ("yexpressions", 3),
    ("yexternal", 4),
    ("ydns", 3),
    ("yminify", 4),
    ("yredirects", 4),
    ("ydupes", 4),
    ("yetags", 2),
    ("yxhr", 4),
    ("yxhrmethod", 3),
    ("ymindom", 3),
    ("yno404", 4),
    ("ymincookie", 3),
    ("ycookiefree", 3),
    ("ynofilter", 4),
    ("yimgnoscale", 3),
    ("yfavicon", 2),
];

const YSLOW1: [(&str, i64); 13] = [
    ("ynumreq", 8),
    ("ycdn", 6),
    ("yexpires", 10),
    ("ycompress", 8),
    ("ycsstop", 4),
    ("yjsbottom", 4),
    ("yexpressions", 3),
    ("yexternal", 4),
    ("ydns", 3),
    ("yminify", 4),
    ("yredirects", 4),
    ("ydupes", 4),
    ("yetags", 2),
];

const YBLOG: [(&str, i64); 15] = [
    ("ynumreq", 8),
    ("yemptysrc", 30),
    ("ycompress", 8),
    ("ycsstop", 4),
    ("yjsbottom", 4),
    ("yexpressions", 3),
    ("ydns", 3),
    ("yminify", 4),
    ("yredirects", 4),
    ("ydupes", 4),
    ("ymindom", 3),
    ("yno404", 4),
    ("ynofilter", 4),
    ("yimgnoscale", 3),
    ("yfavicon", 2),
];

fn weighted(id: &str, name: &str, table: &[(&str, i64)]) -> Ruleset {
    table
        .iter()
        .fold(Ruleset::new(id, name), |ruleset, (rule_id, weight)| {
            ruleset.rule(*rule_id, RuleConfig::new()).weight(*rule_id, *weight)
        })
}

/// The three rulesets shipped with the engine.
pub(crate) fn builtin_rulesets() -> Vec<Ruleset> {
    let classic = weighted("yslow1", "Classic(V1)", &YSLOW1)
        .rule(
            "yminify",
            RuleConfig::from_value(json!({"types": ["js"], "check_inline": false})),
        )
        .rule("ydupes", RuleConfig::from_value(json!({"types": ["js"]})));
    vec![
        weighted("ydefault", "YSlow(V2)", &YDEFAULT),
        classic,
        weighted("yblog", "Small Site or Blog", &YBLOG),
    ]
}
