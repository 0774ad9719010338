//! Page components.
//!
//! A [`Component`] is one fetched resource of a page (document, script,
//! stylesheet, image, ...) together with the HTTP facts the rules inspect.
//! Components are created by [`crate::ComponentCollection`] and enriched once
//! from a [`NetResponse`].

mod dimensions;
mod expiry;
mod headers;
mod response;
mod types;

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

use crate::config::{
    BEACON_MAX_DIMENSION, COMPRESSION_RATIO_ESTIMATE, HEADER_CONTENT_ENCODING,
    HEADER_CONTENT_LENGTH, HEADER_ETAG, HEADER_EXPIRES, HEADER_LAST_MODIFIED, HEADER_LOCATION,
    HEADER_SET_COOKIE, OLD_MODIFIED_THRESHOLD_MS,
};

pub use dimensions::probe_dimensions;
pub use expiry::{max_age_expiry, max_age_seconds, parse_http_date};
pub use headers::Headers;
pub(crate) use response::Reply;
pub use response::{InfoReply, InfoRequest, NetInfoFetcher, NetResponse, StaticFetcher};
pub use types::{ComponentType, Compression, ElementHint, ObjectProps};

/// Collection-unique component identifier, starting at 1.
pub type ComponentId = u32;

/// Whether network metadata has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoState {
    #[default]
    None,
    Done,
}

/// A redirect target discovered while enriching a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RedirectTarget {
    pub(crate) location: String,
    pub(crate) kind: ComponentType,
    pub(crate) after_onload: bool,
}

/// One fetched page resource.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub id: ComponentId,
    /// Absolute URL
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// HTTP status, 0 when unknown
    pub status: u16,
    pub headers: Headers,
    #[serde(skip)]
    pub raw_headers: String,
    #[serde(skip)]
    pub body: Vec<u8>,
    /// Transferred size in bytes
    pub size: u64,
    pub compressed: Compression,
    pub size_compressed: Option<u64>,
    /// Body length after decompression
    pub uncompressed_size: u64,
    pub expires: Option<DateTime<Utc>>,
    /// `Cookie` header sent with the request
    pub cookie_sent: String,
    pub method: String,
    pub resp_time_ms: Option<u64>,
    pub after_onload: bool,
    pub is_beacon: bool,
    pub object_props: Option<ObjectProps>,
    /// Kind reported by the network layer
    pub response_kind: Option<ComponentType>,
    pub info_state: InfoState,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        url: String,
        kind: ComponentType,
        hint: Option<ElementHint>,
    ) -> Self {
        Self {
            id,
            url,
            kind,
            status: 0,
            headers: Headers::new(),
            raw_headers: String::new(),
            body: Vec::new(),
            size: 0,
            compressed: Compression::None,
            size_compressed: None,
            uncompressed_size: 0,
            expires: None,
            cookie_sent: String::new(),
            method: "unknown".to_string(),
            resp_time_ms: None,
            after_onload: false,
            is_beacon: false,
            object_props: hint.map(|h| ObjectProps {
                width: Some(h.width),
                height: Some(h.height),
                ..Default::default()
            }),
            response_kind: None,
            info_state: InfoState::None,
        }
    }

    /// Applies network metadata. Runs once per component.
    ///
    /// Returns the redirect target when the response carries a `Location`
    /// header; the caller registers it in the same collection.
    pub(crate) fn populate(
        &mut self,
        response: Option<NetResponse>,
        onload_timestamp: Option<i64>,
        now: DateTime<Utc>,
    ) -> Option<RedirectTarget> {
        if self.info_state == InfoState::Done {
            debug!("Component {} already enriched, ignoring reply", self.url);
            return None;
        }
        self.info_state = InfoState::Done;
        let response = response.unwrap_or_default();

        self.status = response.status;
        self.headers = response.headers;
        self.raw_headers = response.raw_headers;
        self.body = response.body;
        self.cookie_sent = response.cookie_sent.unwrap_or_default();
        self.resp_time_ms = response.resp_time_ms;
        self.response_kind = response.kind;
        if let Some(method) = response.method.filter(|m| !m.is_empty()) {
            self.method = method;
        }

        // Type refinement: unknown adopts the reported kind, doc adopts it
        // unless the report is itself unknown
        if let Some(reported) = response.kind {
            if self.kind == ComponentType::Unknown
                || (self.kind == ComponentType::Doc && reported != ComponentType::Unknown)
            {
                self.kind = reported;
            }
        }

        match (response.start_timestamp, onload_timestamp) {
            (Some(start), Some(onload)) => self.after_onload = start > onload,
            _ => {
                if let Some(after) = response.after_onload {
                    self.after_onload = after;
                }
            }
        }

        let redirect = self.headers.get(HEADER_LOCATION).map(|location| {
            let kind = if self.kind == ComponentType::Redirect {
                ComponentType::Unknown
            } else {
                self.kind
            };
            RedirectTarget {
                location: location.to_string(),
                kind,
                after_onload: self.after_onload,
            }
        });
        if redirect.is_some() {
            self.kind = ComponentType::Redirect;
        }

        self.apply_sizes(response.size);
        self.expires = self
            .headers
            .get(HEADER_EXPIRES)
            .and_then(parse_http_date)
            .or_else(|| self.max_age_expiry_at(now));

        if self.kind == ComponentType::Image {
            let dimensions = probe_dimensions(&self.body).or(response.image_size);
            if let Some((width, height)) = dimensions.filter(|(w, h)| *w > 0 && *h > 0) {
                let props = self.object_props.get_or_insert_with(ObjectProps::default);
                props.actual_width = Some(width);
                props.actual_height = Some(height);
                self.is_beacon = width < BEACON_MAX_DIMENSION && height < BEACON_MAX_DIMENSION;
            }
        }

        redirect
    }

    fn apply_sizes(&mut self, network_size: Option<u64>) {
        let body_len = self.body.len() as u64;
        let content_length = self
            .headers
            .get(HEADER_CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|len| *len > 0);
        let network_size = network_size.filter(|size| *size > 0);

        self.compressed = self
            .headers
            .get(HEADER_CONTENT_ENCODING)
            .map(Compression::from_header)
            .unwrap_or_default();

        let size = if self.compressed.is_compressed() {
            let decoded = if body_len > 0 { Some(body_len) } else { None };
            self.size_compressed = Some(
                content_length
                    .or(network_size)
                    .unwrap_or(decoded.unwrap_or(0) / COMPRESSION_RATIO_ESTIMATE),
            );
            decoded
        } else {
            content_length.or(network_size).or(Some(body_len))
        };

        self.size = size
            .filter(|s| *s > 0)
            .or(network_size)
            .unwrap_or(body_len);
        self.uncompressed_size = body_len;
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Host part of the URL, lowercase, empty when it has none.
    pub fn hostname(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default()
    }

    /// `ETag` header value, empty when absent.
    pub fn etag(&self) -> &str {
        self.headers.get(HEADER_ETAG).unwrap_or("")
    }

    /// Expiry implied by `Cache-Control: max-age`.
    pub fn max_age_expiry(&self) -> Option<DateTime<Utc>> {
        self.max_age_expiry_at(Utc::now())
    }

    pub fn max_age_expiry_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.headers
            .get(crate::config::HEADER_CACHE_CONTROL)
            .and_then(|value| max_age_expiry(value, now))
    }

    /// True when `Last-Modified` is more than a day old.
    pub fn has_old_modified_date(&self) -> bool {
        self.has_old_modified_date_at(Utc::now())
    }

    pub fn has_old_modified_date_at(&self, now: DateTime<Utc>) -> bool {
        self.headers
            .get(HEADER_LAST_MODIFIED)
            .and_then(parse_http_date)
            .is_some_and(|modified| {
                (now - modified).num_milliseconds() > OLD_MODIFIED_THRESHOLD_MS
            })
    }

    /// True when the component expires more than `min_seconds` from now.
    pub fn has_far_future_expiry(&self, min_seconds: i64) -> bool {
        self.has_far_future_expiry_at(min_seconds, Utc::now())
    }

    pub fn has_far_future_expiry_at(&self, min_seconds: i64, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| {
            (expires - now).num_milliseconds() > min_seconds.saturating_mul(1000)
        })
    }

    /// True when the component expires later than `now + seconds`.
    pub(crate) fn expires_after(&self, seconds: i64, now: DateTime<Utc>) -> bool {
        let horizon = Duration::try_seconds(seconds)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);
        self.expires.is_some_and(|expires| expires > horizon)
    }

    /// Bytes of cookies set by the response.
    pub fn set_cookie_size(&self) -> usize {
        cookie_size(self.headers.get(HEADER_SET_COOKIE).unwrap_or(""))
    }

    /// Bytes of cookies sent with the request.
    pub fn received_cookie_size(&self) -> usize {
        cookie_size(&self.cookie_sent)
    }
}

fn cookie_size(joined: &str) -> usize {
    joined.split('\n').map(str::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn populated(kind: ComponentType, response: NetResponse) -> (Component, Option<RedirectTarget>) {
        let mut component = Component::new(1, "http://ex.com/a".to_string(), kind, None);
        let redirect = component.populate(Some(response), None, now());
        (component, redirect)
    }

    #[test]
    fn test_gzip_without_length_estimates_a_third() {
        let (c, _) = populated(
            ComponentType::Js,
            NetResponse::new(200)
                .header("Content-Encoding", "gzip")
                .body(vec![b'x'; 300]),
        );
        assert_eq!(c.compressed, Compression::Gzip);
        assert_eq!(c.size_compressed, Some(100));
        assert_eq!(c.size, 300);
        assert_eq!(c.uncompressed_size, 300);
    }

    #[test]
    fn test_gzip_prefers_content_length() {
        let (c, _) = populated(
            ComponentType::Css,
            NetResponse::new(200)
                .header("Content-Encoding", "gzip")
                .header("Content-Length", "80")
                .body(vec![b'x'; 300]),
        );
        assert_eq!(c.size_compressed, Some(80));
    }

    #[test]
    fn test_uncompressed_size_sources() {
        let (c, _) = populated(
            ComponentType::Js,
            NetResponse::new(200)
                .header("Content-Length", "1234")
                .body(vec![b'x'; 10]),
        );
        assert_eq!(c.size, 1234);
        assert_eq!(c.size_compressed, None);

        let (c, _) = populated(ComponentType::Js, NetResponse::new(200).size(555));
        assert_eq!(c.size, 555);

        let (c, _) = populated(ComponentType::Js, NetResponse::new(200).body("abc"));
        assert_eq!(c.size, 3);
    }

    #[test]
    fn test_missing_metadata_resolves_with_zero_size() {
        let mut c = Component::new(1, "http://ex.com/a.js".to_string(), ComponentType::Js, None);
        assert!(c.populate(None, None, now()).is_none());
        assert_eq!(c.info_state, InfoState::Done);
        assert_eq!(c.size, 0);
        assert_eq!(c.method, "unknown");
    }

    #[test]
    fn test_populate_runs_once() {
        let mut c = Component::new(1, "http://ex.com/a.js".to_string(), ComponentType::Js, None);
        c.populate(Some(NetResponse::new(200).body("first")), None, now());
        c.populate(Some(NetResponse::new(404).body("second")), None, now());
        assert_eq!(c.status, 200);
        assert_eq!(c.body_text(), "first");
    }

    #[test]
    fn test_location_retypes_to_redirect() {
        let (c, redirect) = populated(
            ComponentType::Image,
            NetResponse::new(302).header("Location", "/b.png"),
        );
        assert_eq!(c.kind, ComponentType::Redirect);
        let target = redirect.expect("redirect target");
        assert_eq!(target.location, "/b.png");
        assert_eq!(target.kind, ComponentType::Image);
    }

    #[test]
    fn test_redirect_of_redirect_is_unknown() {
        let (_, redirect) = populated(
            ComponentType::Redirect,
            NetResponse::new(301).header("Location", "http://ex.com/c"),
        );
        assert_eq!(redirect.map(|r| r.kind), Some(ComponentType::Unknown));
    }

    #[test]
    fn test_type_refinement() {
        let (c, _) = populated(ComponentType::Unknown, NetResponse::new(200).kind(ComponentType::Css));
        assert_eq!(c.kind, ComponentType::Css);

        let (c, _) = populated(ComponentType::Doc, NetResponse::new(200).kind(ComponentType::Unknown));
        assert_eq!(c.kind, ComponentType::Doc);

        let (c, _) = populated(ComponentType::Doc, NetResponse::new(200).kind(ComponentType::Image));
        assert_eq!(c.kind, ComponentType::Image);

        let (c, _) = populated(ComponentType::Js, NetResponse::new(200).kind(ComponentType::Css));
        assert_eq!(c.kind, ComponentType::Js);
    }

    #[test]
    fn test_max_age_is_far_future() {
        let (c, _) = populated(
            ComponentType::Js,
            NetResponse::new(200).header("Cache-Control", "max-age=500000"),
        );
        assert!(c.has_far_future_expiry_at(172_800, now()));
        assert!(!c.has_far_future_expiry_at(600_000, now()));
    }

    #[test]
    fn test_invalid_expires_falls_back_to_max_age() {
        let (c, _) = populated(
            ComponentType::Js,
            NetResponse::new(200)
                .header("Expires", "0")
                .header("Cache-Control", "max-age=60"),
        );
        assert_eq!(c.expires, Some(now() + Duration::seconds(60)));
    }

    #[test]
    fn test_expires_header_wins() {
        let (c, _) = populated(
            ComponentType::Css,
            NetResponse::new(200)
                .header("Expires", "Thu, 01 Dec 2044 16:00:00 GMT")
                .header("Cache-Control", "max-age=60"),
        );
        assert_eq!(c.expires, Some(Utc.with_ymd_and_hms(2044, 12, 1, 16, 0, 0).unwrap()));
    }

    #[test]
    fn test_old_modified_date() {
        let (c, _) = populated(
            ComponentType::Image,
            NetResponse::new(200).header("Last-Modified", "Wed, 29 May 2024 12:00:00 GMT"),
        );
        assert!(c.has_old_modified_date_at(now()));

        let (c, _) = populated(
            ComponentType::Image,
            NetResponse::new(200).header("Last-Modified", "Sat, 01 Jun 2024 06:00:00 GMT"),
        );
        assert!(!c.has_old_modified_date_at(now()));
    }

    #[test]
    fn test_after_onload_from_timestamps() {
        let mut c = Component::new(1, "http://ex.com/a.js".to_string(), ComponentType::Js, None);
        let response = NetResponse {
            start_timestamp: Some(2_000),
            after_onload: Some(false),
            ..NetResponse::new(200)
        };
        c.populate(Some(response), Some(1_000), now());
        assert!(c.after_onload);
    }

    #[test]
    fn test_image_hint_marks_beacon() {
        let mut c = Component::new(
            1,
            "http://ex.com/b.gif".to_string(),
            ComponentType::Image,
            Some(ElementHint { width: 1, height: 1 }),
        );
        let response = NetResponse {
            image_size: Some((1, 1)),
            ..NetResponse::new(200)
        };
        c.populate(Some(response), None, now());
        assert!(c.is_beacon);
        let props = c.object_props.expect("props");
        assert_eq!(props.actual_width, Some(1));
        assert_eq!(props.width, Some(1));
    }

    #[test]
    fn test_cookie_sizes_and_etag() {
        let (c, _) = populated(
            ComponentType::Js,
            NetResponse::new(200)
                .header("Set-Cookie", "a=1")
                .header("Set-Cookie", "bb=22")
                .header("ETag", "\"abc\"")
                .cookie_sent("session=xyz"),
        );
        assert_eq!(c.set_cookie_size(), 8);
        assert_eq!(c.received_cookie_size(), 11);
        assert_eq!(c.etag(), "\"abc\"");
        assert_eq!(c.hostname(), "ex.com");
    }
}
