//! Captured pages.
//!
//! A capture is a JSON snapshot of one page load: the page URL, optionally its
//! markup or pre-extracted document facts, and every component the discovery
//! side found together with the response the network side recorded for it.
//! Loading a capture replays it through a [`StaticFetcher`].

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::collection::{resolve_component_url, ComponentCollection, LintFilters};
use crate::component::{ComponentType, ElementHint, NetResponse, StaticFetcher};
use crate::config::{EngineConfig, HEADER_CONTENT_TYPE};
use crate::document::PageDocument;
use crate::error_handling::CaptureError;
use crate::events::EventSink;

/// One discovered component and what the network returned for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturedComponent {
    /// URL as discovered, possibly relative
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Base the URL is relative to; the page URL when absent
    pub base_href: Option<String>,
    pub hint: Option<ElementHint>,
    /// `None` when the network side recorded nothing
    pub response: Option<NetResponse>,
}

/// Snapshot of one page load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCapture {
    pub url: String,
    /// Page markup; used for the document facts and the document body
    pub html: Option<String>,
    /// Document facts, taking precedence over `html`
    pub document: Option<PageDocument>,
    /// Onload time, epoch milliseconds
    pub onload_timestamp: Option<i64>,
    /// `document.cookie`
    pub cookie: Option<String>,
    pub components: Vec<CapturedComponent>,
}

/// A capture replayed into engine inputs.
#[derive(Debug)]
pub struct LoadedPage {
    pub document: PageDocument,
    pub components: ComponentCollection,
}

impl PageCapture {
    /// Parses a capture.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed JSON, `MissingUrl` when `url` is empty.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let capture: PageCapture = serde_json::from_str(json)?;
        if capture.url.trim().is_empty() {
            return Err(CaptureError::MissingUrl);
        }
        Ok(capture)
    }

    /// Reads and parses a capture file.
    ///
    /// # Errors
    ///
    /// `Read` when the file cannot be read, otherwise as [`PageCapture::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, CaptureError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn base_of<'a>(&'a self, component: &'a CapturedComponent) -> &'a str {
        component.base_href.as_deref().unwrap_or(&self.url)
    }

    fn has_doc_component(&self) -> bool {
        self.components.iter().any(|c| c.kind == ComponentType::Doc)
    }

    /// Fetcher answering with the recorded responses, keyed by resolved URL.
    ///
    /// When the capture lists no document component, the page itself is
    /// answered with the captured markup.
    pub fn fetcher(&self) -> StaticFetcher {
        let mut fetcher = StaticFetcher::new();
        if !self.has_doc_component() {
            if let (Some(html), Some(url)) =
                (&self.html, resolve_component_url(&self.url, &self.url))
            {
                fetcher.insert(
                    url,
                    NetResponse::new(200)
                        .header(HEADER_CONTENT_TYPE, "text/html")
                        .body(html.as_bytes()),
                );
            }
        }
        for component in &self.components {
            let (Some(response), Some(url)) = (
                &component.response,
                resolve_component_url(&component.url, self.base_of(component)),
            ) else {
                continue;
            };
            fetcher.insert(url, response.clone());
        }
        fetcher
    }

    /// Document facts: the captured ones, else parsed from the markup, else
    /// an empty document. The captured cookie overrides either.
    pub fn document(&self) -> PageDocument {
        let mut document = match (&self.document, &self.html) {
            (Some(document), _) => document.clone(),
            (None, Some(html)) => PageDocument::from_html(&self.url, html),
            (None, None) => PageDocument::new(self.url.clone()),
        };
        if document.url.is_empty() {
            document.url = self.url.clone();
        }
        if let Some(cookie) = &self.cookie {
            document.cookie = cookie.clone();
        }
        document
    }

    /// Replays the capture and waits for every component's metadata.
    pub async fn load(&self, config: &EngineConfig, events: Arc<dyn EventSink>) -> LoadedPage {
        let mut components = ComponentCollection::new(Arc::new(self.fetcher()))
            .with_events(events)
            .with_filters(LintFilters::from(config));
        if let Some(onload) = self.onload_timestamp {
            components = components.with_onload_timestamp(onload);
        }

        if !self.has_doc_component() {
            components.add_component(&self.url, ComponentType::Doc, &self.url, None);
        }
        for component in &self.components {
            components.add_component(
                &component.url,
                component.kind,
                self.base_of(component),
                component.hint,
            );
        }
        debug!("Replaying {} captured components", components.len());
        components.wait_complete().await;
        info!("Loaded {} components for {}", components.len(), self.url);

        LoadedPage {
            document: self.document(),
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    const CAPTURE: &str = r#"{
        "url": "http://ex.com/dir/",
        "html": "<html><head><script src=\"a.js\"></script></head><body><p>hi</p></body></html>",
        "cookie": "sid=1",
        "components": [
            {"url": "a.js", "type": "js", "response": {"status": 200, "body": "var a = 1;"}},
            {"url": "img/a.png", "type": "image", "hint": {"width": 10, "height": 10}},
            {"url": "javascript:void(0)", "type": "js"},
            {"url": "", "type": "image"}
        ]
    }"#;

    #[test]
    fn test_parse_capture() {
        let capture = PageCapture::from_json(CAPTURE).unwrap();
        assert_eq!(capture.components.len(), 4);
        assert_eq!(capture.components[1].kind, ComponentType::Image);
        assert_eq!(
            capture.components[1].hint,
            Some(ElementHint {
                width: 10,
                height: 10
            })
        );
        assert!(capture.components[1].response.is_none());
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(matches!(
            PageCapture::from_json(r#"{"components": []}"#),
            Err(CaptureError::MissingUrl)
        ));
        assert!(matches!(
            PageCapture::from_json("not json"),
            Err(CaptureError::Parse(_))
        ));
    }

    #[test]
    fn test_document_from_html_with_cookie() {
        let capture = PageCapture::from_json(CAPTURE).unwrap();
        let document = capture.document();
        assert_eq!(document.url, "http://ex.com/dir/");
        assert_eq!(document.cookie, "sid=1");
        assert_eq!(
            document.head_scripts[0].src.as_deref(),
            Some("http://ex.com/dir/a.js")
        );
    }

    #[tokio::test]
    async fn test_load_replays_components() {
        let capture = PageCapture::from_json(CAPTURE).unwrap();
        let sink = Arc::new(MemorySink::new());
        let page = capture.load(&EngineConfig::default(), sink.clone()).await;
        let cset = &page.components;

        assert!(cset.is_complete());
        assert_eq!(cset.len(), 3);
        let doc = cset.doc_component().unwrap();
        assert_eq!(doc.url, "http://ex.com/dir/");
        assert!(doc.body_text().contains("<p>hi</p>"));

        let script = cset.get_by_url("http://ex.com/dir/a.js").unwrap();
        assert_eq!(script.size, 10);
        assert!(cset.get_by_url("http://ex.com/dir/img/a.png").is_some());
        assert_eq!(cset.empty_urls().get(&ComponentType::Image), Some(&1));
        assert_eq!(
            sink.count(|e| matches!(e, crate::events::EngineEvent::ComponentFetchError { .. })),
            1
        );
    }
}
