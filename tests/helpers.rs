// Shared test helpers for building pages from in-memory responses.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagegrade::{ComponentCollection, ComponentType, NetResponse, StaticFetcher};

pub const BASE: &str = "http://www.example.com/";

/// Builds a completed collection from `(url, kind, response)` triples.
/// URLs are resolved against [`BASE`].
#[allow(dead_code)] // Used by other test files
pub fn page(entries: Vec<(&str, ComponentType, NetResponse)>) -> ComponentCollection {
    let fetcher = entries.iter().fold(StaticFetcher::new(), |fetcher, (url, _, response)| {
        let absolute = url::Url::parse(BASE)
            .and_then(|base| base.join(url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        fetcher.with(absolute, response.clone())
    });
    let mut cset = ComponentCollection::new(Arc::new(fetcher));
    for (url, kind, _) in &entries {
        cset.add_component(url, *kind, BASE, None);
    }
    cset.notify_peel_done();
    cset
}

/// RFC 1123 date as sent in HTTP headers.
#[allow(dead_code)]
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
