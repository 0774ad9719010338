//! Rules about page markup, stylesheets and scripts.

use std::collections::HashSet;

use serde_json::json;

use crate::collection::ComponentCollection;
use crate::component::{ComponentType, ObjectProps};
use crate::document::{script_srcs, InlineTag, PageDocument};
use crate::error_handling::LintError;
use crate::rules::text::{count_alpha_image_loader_filters, count_expressions, is_minified, plural};
use crate::rules::{LintOutcome, Offender, RuleConfig, Score};

pub(super) fn ycsstop_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 10}))
}

pub(super) fn ycsstop(
    doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let body_links: HashSet<&str> = doc.body_stylesheets.iter().map(String::as_str).collect();
    let offenders: Vec<Offender> = cset
        .by_type(&[ComponentType::Css])
        .into_iter()
        .filter(|c| body_links.contains(c.url.as_str()))
        .map(Offender::component)
        .collect();

    if offenders.is_empty() {
        return Ok(LintOutcome::points(100, ""));
    }
    // One offender already drops a full grade
    let score = 100 - (1 + offenders.len() as i64 * points);
    Ok(LintOutcome {
        score: Score::Points(score),
        message: plural(
            "There %are% %num% stylesheet%s% found in the body of the document",
            offenders.len(),
        ),
        offenders,
    })
}

pub(super) fn yjsbottom_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5}))
}

/// Head scripts count only when present in the served markup; scripts
/// injected at runtime and deferred scripts are ignored.
pub(super) fn yjsbottom(
    doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let raw_srcs = cset
        .by_type(&[ComponentType::Doc])
        .first()
        .map(|raw| script_srcs(&raw.body_text(), &raw.url))
        .unwrap_or_default();

    let head_srcs: HashSet<&str> = doc
        .head_scripts
        .iter()
        .filter(|script| !script.defer)
        .filter_map(|script| script.src.as_deref())
        .filter(|src| raw_srcs.contains(*src))
        .collect();

    let offenders = cset
        .by_type(&[ComponentType::Js])
        .into_iter()
        .filter(|c| head_srcs.contains(c.url.as_str()))
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% JavaScript script%s% found in the head of the document",
    ))
}

pub(super) fn yexpressions_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 2}))
}

pub(super) fn yexpressions(
    doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let mut total = 0;
    let mut offenders = Vec::new();

    for component in cset.by_type(&[ComponentType::Css]) {
        let count = cset.memo().expression_count(component);
        if count > 0 {
            total += count;
            offenders.push(Offender::component(component));
        }
    }
    for (index, style) in doc.inline_styles.iter().enumerate() {
        let count = count_expressions(style);
        if count > 0 {
            total += count;
            offenders.push(Offender::text(format!(
                "inline <style> tag #{} ({})",
                index + 1,
                plural("%num% expression%s%", count)
            )));
        }
    }

    if total == 0 {
        return Ok(LintOutcome::points(100, ""));
    }
    Ok(LintOutcome {
        score: Score::Points(90 - total as i64 * points),
        message: format!(
            "There are a total of {}",
            plural("%num% expression%s%", total)
        ),
        offenders,
    })
}

pub(super) fn yexternal_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"check_inline": ["style", "script"]}))
}

/// Informational only: lists inline code without scoring it.
pub(super) fn yexternal(
    doc: &PageDocument,
    _cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let mut offenders = Vec::new();
    for tag in config.inline_tags("check_inline")? {
        let count = doc.inline(tag).len();
        if count > 0 {
            let template = match tag {
                InlineTag::Style => "There are a total of %num% inline css",
                InlineTag::Script => "There are a total of %num% inline script%s%",
            };
            offenders.push(Offender::text(plural(template, count)));
        }
    }
    Ok(LintOutcome {
        score: Score::NotApplicable,
        message: "Only consider this if your property is a common user home page.".to_string(),
        offenders,
    })
}

pub(super) fn yminify_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({
        "points": 10,
        "types": ["js", "css"],
        "check_inline": ["style", "script"],
    }))
}

pub(super) fn yminify(
    doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let types = config.types("types")?;
    let mut offenders: Vec<Offender> = cset
        .by_type(&types)
        .into_iter()
        .filter(|c| !cset.memo().minified(c))
        .map(Offender::component)
        .collect();

    for tag in config.inline_tags("check_inline")? {
        for (index, code) in doc.inline(tag).iter().enumerate() {
            if !is_minified(code) {
                offenders.push(Offender::text(format!("Inline {} tag #{}", tag, index + 1)));
            }
        }
    }
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% component%s% that can be minified",
    ))
}

pub(super) fn ynofilter_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5, "halfpoints": 2}))
}

/// Plain filters cost `points`; `_filter` hacks, which only IE6 reads,
/// cost `halfpoints`.
pub(super) fn ynofilter(
    doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let halfpoints = config.int("halfpoints")?;
    let mut normal = 0;
    let mut hack = 0;
    let mut offenders = Vec::new();

    for component in cset.by_type(&[ComponentType::Css]) {
        let count = cset.memo().filter_count(component);
        normal += count.normal;
        hack += count.hack;
        if count.total() > 0 {
            offenders.push(Offender::component(component));
        }
    }
    for (index, style) in doc.inline_styles.iter().enumerate() {
        let count = count_alpha_image_loader_filters(style);
        normal += count.normal;
        hack += count.hack;
        if count.total() > 0 {
            offenders.push(Offender::text(format!(
                "inline <style> tag #{} ({})",
                index + 1,
                plural("%num% filter%s%", count.total())
            )));
        }
    }

    let total = normal + hack;
    let message = if total > 0 {
        format!("There are a total of {}", plural("%num% filter%s%", total))
    } else {
        String::new()
    };
    Ok(LintOutcome {
        score: Score::Points(100 - (normal as i64 * points + hack as i64 * halfpoints)),
        message,
        offenders,
    })
}

pub(super) fn yimgnoscale_defaults() -> RuleConfig {
    RuleConfig::from_value(json!({"points": 5}))
}

/// Images displayed smaller than their natural size. Scaling up is allowed.
pub(super) fn yimgnoscale(
    _doc: &PageDocument,
    cset: &ComponentCollection,
    config: &RuleConfig,
) -> Result<LintOutcome, LintError> {
    let points = config.int("points")?;
    let offenders = cset
        .by_type(&[ComponentType::Image])
        .into_iter()
        .filter(|c| c.object_props.as_ref().is_some_and(ObjectProps::is_scaled_down))
        .map(Offender::component)
        .collect();
    Ok(LintOutcome::per_offender(
        offenders,
        points,
        "There %are% %num% image%s% that %are% scaled down",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ElementHint, NetResponse, StaticFetcher};
    use crate::document::ScriptTag;
    use crate::rules::builtin::fixture::{ok, page, BASE};
    use std::sync::Arc;

    fn doc() -> PageDocument {
        PageDocument::new(BASE)
    }

    #[test]
    fn test_ycsstop() {
        let cset = page(vec![
            ("top.css", ComponentType::Css, ok()),
            ("late.css", ComponentType::Css, ok()),
        ]);
        let mut page_doc = doc();
        page_doc.body_stylesheets = vec!["http://www.example.com/late.css".to_string()];
        let outcome = ycsstop(&page_doc, &cset, &ycsstop_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(89));
        assert_eq!(
            outcome.message,
            "There is 1 stylesheet found in the body of the document"
        );
    }

    #[test]
    fn test_yjsbottom_ignores_injected_and_deferred_scripts() {
        let html = r#"<html><head>
            <script src="/a.js"></script>
            <script src="/b.js" defer></script>
            </head><body></body></html>"#;
        let cset = page(vec![
            ("http://www.example.com/", ComponentType::Doc, ok().body(html)),
            ("a.js", ComponentType::Js, ok()),
            ("b.js", ComponentType::Js, ok()),
            ("injected.js", ComponentType::Js, ok()),
        ]);
        let mut page_doc = doc();
        page_doc.head_scripts = ["a.js", "b.js", "injected.js"]
            .iter()
            .map(|name| ScriptTag {
                src: Some(format!("http://www.example.com/{name}")),
                defer: *name == "b.js",
            })
            .collect();

        let outcome = yjsbottom(&page_doc, &cset, &yjsbottom_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(95));
        assert_eq!(
            outcome.offenders,
            vec![Offender::Component {
                id: 2,
                url: "http://www.example.com/a.js".to_string()
            }]
        );
    }

    #[test]
    fn test_yexpressions() {
        let cset = page(vec![(
            "a.css",
            ComponentType::Css,
            ok().body("a{width:expression(1)} b{height:expression(2)}"),
        )]);
        let mut page_doc = doc();
        page_doc.inline_styles = vec!["p{}".to_string(), "i{top:expression(0)}".to_string()];
        let outcome = yexpressions(&page_doc, &cset, &yexpressions_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(84));
        assert_eq!(outcome.message, "There are a total of 3 expressions");
        assert_eq!(
            outcome.offenders[1],
            Offender::text("inline <style> tag #2 (1 expression)")
        );
    }

    #[test]
    fn test_yexternal_is_informational() {
        let cset = page(Vec::new());
        let mut page_doc = doc();
        page_doc.inline_styles = vec!["a{}".to_string()];
        page_doc.inline_scripts = vec!["1".to_string(), "2".to_string()];
        let outcome = yexternal(&page_doc, &cset, &yexternal_defaults()).unwrap();
        assert_eq!(outcome.score, Score::NotApplicable);
        assert_eq!(
            outcome.offenders,
            vec![
                Offender::text("There are a total of 1 inline css"),
                Offender::text("There are a total of 2 inline scripts"),
            ]
        );
    }

    #[test]
    fn test_yminify() {
        let spaced = "function f() {\n\n\n\n    return 1;\n\n\n\n}\n";
        let cset = page(vec![
            ("min.js", ComponentType::Js, ok().body("function f(){return 1}")),
            ("fat.js", ComponentType::Js, ok().body(spaced)),
        ]);
        let mut page_doc = doc();
        page_doc.inline_scripts = vec![spaced.to_string()];

        let outcome = yminify(&page_doc, &cset, &yminify_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(80));
        assert_eq!(outcome.message, "There are 2 components that can be minified");
        assert_eq!(outcome.offenders[1], Offender::text("Inline script tag #1"));

        let classic = yminify_defaults()
            .with("types", json!(["js"]))
            .with("check_inline", false);
        let outcome = yminify(&page_doc, &cset, &classic).unwrap();
        assert_eq!(outcome.offenders.len(), 1);
    }

    #[test]
    fn test_ynofilter_weights() {
        let cset = page(vec![(
            "ie.css",
            ComponentType::Css,
            ok().body(
                "a{filter:progid:DXImageTransform.Microsoft.AlphaImageLoader(src='a.png');}\
                 b{_filter:progid:DXImageTransform.Microsoft.AlphaImageLoader(src='b.png');}",
            ),
        )]);
        let mut page_doc = doc();
        page_doc.inline_styles =
            vec!["c{_filter:progid:DXImageTransform.Microsoft.AlphaImageLoader(src='c.png');}".to_string()];
        let outcome = ynofilter(&page_doc, &cset, &ynofilter_defaults()).unwrap();
        // 1 plain filter at 5 points, 2 hacks at 2 points
        assert_eq!(outcome.score, Score::Points(91));
        assert_eq!(outcome.message, "There are a total of 3 filters");
        assert_eq!(
            outcome.offenders[1],
            Offender::text("inline <style> tag #1 (1 filter)")
        );
    }

    #[test]
    fn test_yimgnoscale() {
        let fetcher = StaticFetcher::new()
            .with(
                "http://www.example.com/big.png",
                NetResponse {
                    image_size: Some((200, 100)),
                    ..NetResponse::new(200)
                },
            )
            .with(
                "http://www.example.com/up.png",
                NetResponse {
                    image_size: Some((50, 50)),
                    ..NetResponse::new(200)
                },
            );
        let mut cset = ComponentCollection::new(Arc::new(fetcher));
        cset.add_component(
            "big.png",
            ComponentType::Image,
            BASE,
            Some(ElementHint { width: 100, height: 50 }),
        );
        cset.add_component(
            "up.png",
            ComponentType::Image,
            BASE,
            Some(ElementHint { width: 100, height: 100 }),
        );
        cset.notify_peel_done();

        let outcome = yimgnoscale(&doc(), &cset, &yimgnoscale_defaults()).unwrap();
        assert_eq!(outcome.score, Score::Points(95));
        assert_eq!(outcome.message, "There is 1 image that is scaled down");
    }
}
