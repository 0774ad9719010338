//! Cacheability rules.

use chrono::Utc;
use serde_json::json;

use crate::collection::ComponentCollection;
use crate::component::ComponentType;
use crate::config::{HEADER_CACHE_CONTROL, HEADER_SERVER};
use crate::document::PageDocument;
use crate::error_handling::LintError;
use crate::rules::text::{is_etag_good, plural};
use crate::rules::{LintOutcome, Offender, RuleConfig};

pub(super) fn yexpires_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 11,
        "howfar": 172_800,
        "types": ["css", "js", "image", "cssimage", "flash", "favicon"],
    }))
}

/// Components without an expiry beyond `howfar` seconds are offenders.
pub(super) fn yexpires(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let howfar = config.int("howfar")?;
    let points = config.int("points")?;
    let types = config.types("types")?;
    let now = Utc::now();
    let offenders = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| !c.expires_after(howfar, now))
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% static component%s% without a far-future expiration date.",
    ))
}

pub(super) fn yxhr_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5, "min_cache_time": 3600}))
}

/// XHRs explicitly marked `no-cache`/`no-store` are left alone; others must
/// be cacheable for at least `min_cache_time` seconds.
pub(super) fn yxhr(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let min_cache_time = config.int("min_cache_time")?;
    let now = Utc::now();
    let offenders = cset
        .by_type(&[ComponentType::Xhr])
        .into_iter()
        .filter(|c| {
            let uncacheable = c
                .headers
                .get(HEADER_CACHE_CONTROL)
                .is_some_and(|cc| cc.contains("no-cache") || cc.contains("no-store"));
            !uncacheable && !c.expires_after(min_cache_time, now)
        })
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% XHR component%s% that %are% not cacheable",
    ))
}

pub(super) fn yetags_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 11,
        "types": ["flash", "js", "css", "cssimage", "image", "favicon"],
    }))
}

pub(super) fn yetags(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let offenders = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| !is_etag_good(c.etag(), c.headers.get(HEADER_SERVER).unwrap_or("")))
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% component%s% with misconfigured ETags",
    ))
}

pub(super) fn yfavicon_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5, "size": 2000, "min_cache_time": 3600}))
}

/// Checks the first favicon only.
pub(super) fn yfavicon(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let max_size = config.int("size")?;
    let min_cache_time = config.int("min_cache_time")?;

    let mut messages = Vec::new();
    if let Some(favicon) = cset.by_type(&[ComponentType::Favicon]).first() {
        if favicon.size as i64 > max_size {
            messages.push(plural(
                "Favicon is more than %num% bytes",
                max_size.max(0) as usize,
            ));
        }
        // No expiry at all is not reported here; yexpires covers it
        if favicon.expires.is_some() && !favicon.expires_after(min_cache_time, Utc::now()) {
            messages.push("Favicon is not cacheable".to_string());
        }
    }
    Ok(LintOutcome::points(
        100 - messages.len() as i64 * points,
        messages.join("\n"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::NetResponse;
    use crate::rules::builtin::fixture::{ok, page, BASE};
    use crate::rules::Score;
    use chrono::Duration;

    fn doc() -> PageDocument {
        PageDocument::new(BASE)
    }

    fn http_date(offset: Duration) -> String {
        (Utc::now() + offset)
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
    }

    #[test]
    fn test_yexpires() {
        let cset = page(vec![
            (
                "cached.js",
                ComponentType::Js,
                ok().header("Cache-Control", "max-age=500000"),
            ),
            (
                "soon.css",
                ComponentType::Css,
                ok().header("Expires", http_date(Duration::hours(1))),
            ),
            ("plain.png", ComponentType::Image, ok()),
            ("page.html", ComponentType::Doc, ok()),
        ]);
        let outcome = yexpires(&doc(), &cset, &yexpires_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(78));
        assert_eq!(
            outcome.message,
            "There are 2 static components without a far-future expiration date."
        );
        let urls: Vec<_> = outcome
            .offenders
            .iter()
            .map(|o| match o {
                Offender::Component { url, .. } => url.as_str(),
                Offender::Text(text) => text.as_str(),
            })
            .collect();
        assert_eq!(
            urls,
            vec!["http://www.example.com/soon.css", "http://www.example.com/plain.png"]
        );
    }

    #[test]
    fn test_yexpires_howfar_override() {
        let cset = page(vec![(
            "cached.js",
            ComponentType::Js,
            ok().header("Cache-Control", "max-age=500000"),
        )]);
        let strict = yexpires_defaults().with("howfar", 600_000);
        let outcome = yexpires(&doc(), &cset, &strict).unwrap();
        assert_eq!(outcome.score, Score::Points(89));
    }

    #[test]
    fn test_yxhr() {
        let cset = page(vec![
            ("no-store", ComponentType::Xhr, ok().header("Cache-Control", "no-store")),
            ("cached", ComponentType::Xhr, ok().header("Cache-Control", "max-age=7200")),
            ("short", ComponentType::Xhr, ok().header("Cache-Control", "max-age=60")),
            ("bare", ComponentType::Xhr, ok()),
        ]);
        let outcome = yxhr(&doc(), &cset, &yxhr_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(90));
        assert_eq!(outcome.message, "There are 2 XHR components that are not cacheable");
    }

    #[test]
    fn test_yetags() {
        let cset = page(vec![
            (
                "a.js",
                ComponentType::Js,
                ok().header("ETag", "\"2a3f1-4d2-4b1f2c3d\"")
                    .header("Server", "Apache/2.2"),
            ),
            (
                "b.js",
                ComponentType::Js,
                ok().header("ETag", "\"2a3f1-4d2-4b1f2c3d\"").header("Server", "nginx"),
            ),
            ("c.js", ComponentType::Js, ok().header("ETag", "\"2a3f1-4d2-4b1f2c3d\"")),
        ]);
        let outcome = yetags(&doc(), &cset, &yetags_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(89));
        assert_eq!(outcome.message, "There is 1 component with misconfigured ETags");
    }

    #[test]
    fn test_yfavicon_reports_both_problems() {
        let cset = page(vec![(
            "favicon.ico",
            ComponentType::Favicon,
            NetResponse::new(200)
                .size(5000)
                .header("Cache-Control", "max-age=60"),
        )]);
        let outcome = yfavicon(&doc(), &cset, &yfavicon_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(90));
        assert_eq!(
            outcome.message,
            "Favicon is more than 2000 bytes\nFavicon is not cacheable"
        );
    }

    #[test]
    fn test_yfavicon_without_expiry_is_only_size_checked() {
        let cset = page(vec![("favicon.ico", ComponentType::Favicon, ok().size(100))]);
        let outcome = yfavicon(&doc(), &cset, &yfavicon_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(100));
        assert!(outcome.message.is_empty());
    }
}
