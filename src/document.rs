//! Page markup facts.
//!
//! Structural rules (stylesheets in the body, scripts in the head, inline
//! code, DOM size, document cookie) need a few facts about the rendered page.
//! [`PageDocument`] carries them; it is built by the discovery side or parsed
//! from HTML with [`PageDocument::from_html`].

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::collection::resolve_component_url;
use crate::utils::parse_selector_unsafe;

const BODY_LINK_SELECTOR_STR: &str = "body link[href]";
const HEAD_SCRIPT_SELECTOR_STR: &str = "head script";
const STYLE_SELECTOR_STR: &str = "style";
const SCRIPT_SELECTOR_STR: &str = "script";
const ANY_ELEMENT_SELECTOR_STR: &str = "*";

static BODY_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(BODY_LINK_SELECTOR_STR, "BODY_LINK_SELECTOR"));
static HEAD_SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(HEAD_SCRIPT_SELECTOR_STR, "HEAD_SCRIPT_SELECTOR"));
static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(STYLE_SELECTOR_STR, "STYLE_SELECTOR"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(SCRIPT_SELECTOR_STR, "SCRIPT_SELECTOR"));
static ANY_ELEMENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(ANY_ELEMENT_SELECTOR_STR, "ANY_ELEMENT_SELECTOR"));

/// Inline code tags inspected by `yexternal` and `yminify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum InlineTag {
    Style,
    Script,
}

/// A `<script>` element in the document head.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptTag {
    /// Absolute `src`, `None` for inline scripts
    pub src: Option<String>,
    pub defer: bool,
}

/// Structural facts about the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDocument {
    /// Page URL
    pub url: String,
    /// Absolute hrefs of `<link rel="stylesheet">` elements inside `<body>`
    pub body_stylesheets: Vec<String>,
    /// Scripts inside `<head>`, in document order
    pub head_scripts: Vec<ScriptTag>,
    /// Contents of `<style>` elements
    pub inline_styles: Vec<String>,
    /// Contents of `<script>` elements without `src`
    pub inline_scripts: Vec<String>,
    /// Number of elements in the DOM
    pub element_count: usize,
    /// `document.cookie`
    pub cookie: String,
}

impl PageDocument {
    /// Empty document for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Extracts document facts from markup.
    ///
    /// Relative URLs are resolved against `url`. The cookie is not part of the
    /// markup and stays empty.
    pub fn from_html(url: &str, html: &str) -> Self {
        let document = Html::parse_document(html);

        let body_stylesheets = document
            .select(&BODY_LINK_SELECTOR)
            .filter(|link| {
                link.value()
                    .attr("rel")
                    .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
            })
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| resolve_component_url(href, url))
            .collect();

        let head_scripts = document
            .select(&HEAD_SCRIPT_SELECTOR)
            .map(|script| ScriptTag {
                src: script
                    .value()
                    .attr("src")
                    .and_then(|src| resolve_component_url(src, url)),
                defer: script.value().attr("defer").is_some(),
            })
            .collect();

        let inline_styles = document.select(&STYLE_SELECTOR).map(inner_text).collect();
        let inline_scripts = document
            .select(&SCRIPT_SELECTOR)
            .filter(|script| script.value().attr("src").is_none())
            .map(inner_text)
            .collect();

        Self {
            url: url.to_string(),
            body_stylesheets,
            head_scripts,
            inline_styles,
            inline_scripts,
            element_count: document.select(&ANY_ELEMENT_SELECTOR).count(),
            cookie: String::new(),
        }
    }

    /// Inline code blocks of one kind.
    pub fn inline(&self, tag: InlineTag) -> &[String] {
        match tag {
            InlineTag::Style => &self.inline_styles,
            InlineTag::Script => &self.inline_scripts,
        }
    }
}

fn inner_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Absolute `src` URLs of every `<script>` in raw markup.
pub fn script_srcs(html: &str, base_url: &str) -> HashSet<String> {
    Html::parse_document(html)
        .select(&SCRIPT_SELECTOR)
        .filter_map(|script| script.value().attr("src"))
        .filter_map(|src| resolve_component_url(src, base_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>t</title>
  <script src="/js/head.js"></script>
  <script src="/js/deferred.js" defer></script>
  <script>var inline = 1;</script>
  <style>a { color: red; }</style>
</head>
<body>
  <link rel="stylesheet" href="late.css">
  <link rel="icon" href="/favicon.ico">
  <p>hello</p>
</body>
</html>"#;

    #[test]
    fn test_from_html() {
        let doc = PageDocument::from_html("http://ex.com/dir/page.html", PAGE);
        assert_eq!(doc.body_stylesheets, vec!["http://ex.com/dir/late.css"]);
        assert_eq!(doc.head_scripts.len(), 3);
        assert_eq!(
            doc.head_scripts[0],
            ScriptTag {
                src: Some("http://ex.com/js/head.js".to_string()),
                defer: false
            }
        );
        assert!(doc.head_scripts[1].defer);
        assert_eq!(doc.head_scripts[2].src, None);
        assert_eq!(doc.inline_scripts, vec!["var inline = 1;"]);
        assert_eq!(doc.inline_styles, vec!["a { color: red; }"]);
        // html, head, title, 3 scripts, style, body, 2 links, p
        assert_eq!(doc.element_count, 11);
    }

    #[test]
    fn test_script_srcs() {
        let srcs = script_srcs(PAGE, "http://ex.com/");
        assert!(srcs.contains("http://ex.com/js/head.js"));
        assert!(srcs.contains("http://ex.com/js/deferred.js"));
        assert_eq!(srcs.len(), 2);
    }

    #[test]
    fn test_inline_tag_names() {
        assert_eq!(InlineTag::from_str("style"), Ok(InlineTag::Style));
        assert_eq!(InlineTag::Script.to_string(), "script");
        let doc = PageDocument::from_html("http://ex.com/", PAGE);
        assert_eq!(doc.inline(InlineTag::Script).len(), 1);
    }
}
