//! Request-count rules: how many requests a page makes and how many are wasted.

use indexmap::IndexMap;
use serde_json::json;

use crate::collection::ComponentCollection;
use crate::component::{Component, ComponentType};
use crate::config::HEADER_LOCATION;
use crate::document::PageDocument;
use crate::error_handling::LintError;
use crate::rules::text::{plural, unique_domains};
use crate::rules::{LintOutcome, Offender, RuleConfig, Score};

pub(super) fn ynumreq_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "max_js": 3,
        "points_js": 4,
        "max_css": 2,
        "points_css": 4,
        "max_cssimages": 6,
        "points_cssimages": 3,
    }))
}

pub(super) fn ynumreq(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let checks = [
        (
            ComponentType::Js,
            "max_js",
            "points_js",
            "%num% external Javascript script%s%",
            "Try combining them into one.",
        ),
        (
            ComponentType::Css,
            "max_css",
            "points_css",
            "%num% external stylesheet%s%",
            "Try combining them into one.",
        ),
        (
            ComponentType::CssImage,
            "max_cssimages",
            "points_cssimages",
            "%num% external background image%s%",
            "Try combining them with CSS sprites.",
        ),
    ];

    let mut score = 100;
    let mut messages = Vec::new();
    for (kind, max_key, points_key, template, advice) in checks {
        let max = config.int(max_key)?;
        let points = config.int(points_key)?;
        let count = cset.by_type(&[kind]).len() as i64;
        let excess = count - max;
        if excess > 0 {
            score -= excess * points;
            messages.push(format!(
                "This page has {}.  {}",
                plural(template, count as usize),
                advice
            ));
        }
    }
    Ok(LintOutcome::points(score, messages.join("\n")))
}

pub(super) fn ydns_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"max_domains": 4, "points": 5}))
}

/// Counts every distinct component, filtered or not.
pub(super) fn ydns(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let max_domains = config.int("max_domains")?;
    let points = config.int("points")?;
    let domains = unique_domains(cset.components(), true);
    let excess = domains.len() as i64 - max_domains;
    if excess <= 0 {
        return Ok(LintOutcome::points(100, ""));
    }
    Ok(LintOutcome {
        score: Score::Points(100 - excess * points),
        message: plural(
            "The components are split over more than %num% domain%s%",
            max_domains.max(0) as usize,
        ),
        offenders: domains.into_iter().map(Offender::Text).collect(),
    })
}

pub(super) fn yredirects_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 10}))
}

pub(super) fn yredirects(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let offenders = cset
        .by_type(&[ComponentType::Redirect])
        .into_iter()
        .map(|c| {
            Offender::text(format!(
                "{} redirects to {}",
                c.url,
                c.headers.get(HEADER_LOCATION).unwrap_or("")
            ))
        })
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% redirect%s%",
    ))
}

pub(super) fn ydupes_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5, "types": ["js", "css"]}))
}

/// One offender per duplicated URL, in first-seen order.
pub(super) fn ydupes(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let mut seen: IndexMap<&str, (usize, &Component)> = IndexMap::new();
    for component in cset.by_type(&types) {
        seen.entry(component.url.as_str())
            .or_insert((0, component))
            .0 += 1;
    }
    let offenders = seen
        .values()
        .filter(|(count, _)| *count > 1)
        .map(|(_, component)| Offender::component(component))
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% duplicate component%s%",
    ))
}

pub(super) fn yno404_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 5,
        "types": ["css", "js", "image", "cssimage", "flash", "xhr", "favicon"],
    }))
}

pub(super) fn yno404(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let offenders = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| c.status == 404)
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% request%s% that %are% 404 Not Found",
    ))
}

pub(super) fn ymindom_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"range": 250, "points": 10, "maxdom": 900}))
}

pub(super) fn ymindom(
    doc: &PageDocument,
    _cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let maxdom = config.int("maxdom")?;
    let range = config.int("range")?;
    let points = config.int("points")?;
    if range <= 0 {
        return Err(LintError::MalformedOption {
            option: "range".to_string(),
            expected: "a positive integer",
        });
    }
    let count = doc.element_count as i64;
    if count <= maxdom {
        return Ok(LintOutcome::points(100, ""));
    }
    let ranges = (count - maxdom + range - 1) / range;
    Ok(LintOutcome::points(
        99 - ranges * points,
        plural(
            "There %are% %num% DOM element%s% on the page",
            doc.element_count,
        ),
    ))
}

pub(super) fn yemptysrc_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 100}))
}

pub(super) fn yemptysrc(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let empty = cset.empty_urls();
    if empty.is_empty() {
        return Ok(LintOutcome::points(100, ""));
    }
    let mut score = 100;
    let mut parts = Vec::new();
    for (kind, count) in empty {
        score -= *count as i64 * points;
        parts.push(format!("{} {}", count, kind));
    }
    Ok(LintOutcome::points(
        score,
        format!("{} components with empty link were found.", parts.join(", ")),
    ))
}
