//! Server configuration rules.

use regex::Regex;
use serde_json::json;

use crate::collection::ComponentCollection;
use crate::component::ComponentType;
use crate::document::PageDocument;
use crate::error_handling::LintError;
use crate::rules::text::{hostname, plural};
use crate::rules::{LintOutcome, Offender, RuleConfig, Score};

/// Hosts known to be served from a CDN.
const CDN_PATTERNS: [&str; 15] = [
    r"^([^\.]*)\.([^\.]*)\.yimg\.com/[^/]*\.yimg\.com/.*$",
    r"^([^\.]*)\.([^\.]*)\.yimg\.com/[^/]*\.yahoo\.com/.*$",
    r"^sec.yimg.com/",
    r"^a248.e.akamai.net",
    r"^[dehlps].yimg.com",
    r"^(ads|cn|mail|maps|s1).yimg.com",
    r"^a.l.yimg.com",
    r"^us.(js|a)2.yimg.com",
    r"^yui.yahooapis.com",
    r"^adz.kr.yahoo.com",
    r"^img.yahoo.co.kr",
    r"^img.(shopping|news|srch).yahoo.co.kr",
    r"^pimg.kr.yahoo.com",
    r"^kr.img.n2o.yahoo.com",
    r"^s3.amazonaws.com",
];

const CDN_EXCEPTIONS: [&str; 3] = [
    r"^chart.yahoo.com",
    r"^(a1|f3|f5|f3c|f5c).yahoofs.com",
    r"^us.(a1c|f3).yahoofs.com",
];

pub(super) fn ycdn_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 10,
        "patterns": CDN_PATTERNS,
        "exceptions": CDN_EXCEPTIONS,
        "types": ["js", "css", "image", "cssimage", "flash", "favicon"],
    }))
}

fn compile_patterns(config: &RuleConfig, key: &str) -> Result<Vec<Regex>, LintError> {
    config
        .string_list(key)?
        .into_iter()
        .map(|pattern| {
            Regex::new(&pattern).map_err(|e| LintError::InvalidPattern {
                pattern,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Matches each component's host (with port) against the CDN patterns.
///
/// Hosts matching an exception are listed in the message but not penalized.
pub(super) fn ycdn(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let patterns = compile_patterns(config, "patterns")?;
    let exceptions = match config.get("exceptions") {
        Some(_) => compile_patterns(config, "exceptions")?,
        None => Vec::new(),
    };

    let mut offenders = Vec::new();
    let mut excepted = Vec::new();
    for component in cset.by_type(&types) {
        let host = hostname(&component.url);
        if patterns.iter().any(|re| re.is_match(host)) {
            continue;
        }
        if exceptions.iter().any(|re| re.is_match(host)) {
            excepted.push(component.url.as_str());
        } else {
            offenders.push(Offender::component(component));
        }
    }

    let mut message = String::new();
    if !offenders.is_empty() {
        message.push_str(&plural(
            "There %are% %num% static component%s% that %are% not on CDN. ",
            offenders.len(),
        ));
    }
    if !excepted.is_empty() {
        message.push_str(&plural(
            "There %are% %num% component%s% that %are% not on CDN, but %are% exceptions:",
            excepted.len(),
        ));
        message.push(' ');
        message.push_str(&excepted.join(", "));
    }

    Ok(LintOutcome {
        score: Score::Points(100 - offenders.len() as i64 * points),
        message: message.trim_end().to_string(),
        offenders,
    })
}

pub(super) fn ycompress_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "min_filesize": 500,
        "types": ["doc", "iframe", "xhr", "js", "css"],
        "points": 11,
    }))
}

pub(super) fn ycompress(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let min_filesize = config.int("min_filesize")?;
    let types = config.types("types")?;
    let offenders = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| !c.compressed.is_compressed() && c.size as i64 >= min_filesize)
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% plain text component%s% that should be sent compressed",
    ))
}

pub(super) fn yxhrmethod_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5}))
}

pub(super) fn yxhrmethod(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let offenders = cset
        .by_type(&[ComponentType::Xhr])
        .into_iter()
        .filter(|c| c.method != "GET" && c.method != "unknown")
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% XHR component%s% that %do% not use GET HTTP method",
    ))
}

pub(super) fn ymincookie_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 10, "max_cookie_size": 1000}))
}

/// Scores the size of `document.cookie`.
pub(super) fn ymincookie(
    doc: &PageDocument,
    _cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let max = config.int("max_cookie_size")?;
    if max <= 0 {
        return Err(LintError::MalformedOption {
            option: "max_cookie_size".to_string(),
            expected: "a positive integer",
        });
    }
    let size = doc.cookie.len();
    if size as i64 <= max {
        return Ok(LintOutcome::points(100, ""));
    }
    let blocks = size as i64 / max;
    Ok(LintOutcome::points(
        100 - (1 + blocks * points),
        plural("There %are% %num% byte%s% of cookies on this page", size),
    ))
}

pub(super) fn ycookiefree_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 5,
        "types": ["js", "css", "image", "cssimage", "flash", "favicon"],
    }))
}

pub(super) fn ycookiefree(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let offenders = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| !c.cookie_sent.is_empty())
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% component%s% that %are% not cookie-free",
    ))
}
