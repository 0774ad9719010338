//! Network metadata contract.
//!
//! The engine never fetches anything itself. For every new component the
//! collection hands an [`InfoRequest`] and a one-shot [`InfoReply`] to a
//! [`NetInfoFetcher`]. The fetcher answers synchronously or later from another
//! task; dropping the reply unanswered counts as "no metadata".

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::mpsc::UnboundedSender;

use super::headers::Headers;
use super::types::ComponentType;
use super::ComponentId;

/// What the network layer observed for one URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetResponse {
    /// HTTP status, 0 when unknown
    pub status: u16,
    pub headers: Headers,
    pub raw_headers: String,
    /// Decoded body bytes (text on the wire)
    #[serde(with = "body_text")]
    pub body: Vec<u8>,
    pub method: Option<String>,
    /// Kind inferred by the network layer, usually from `Content-Type`
    #[serde(rename = "type")]
    pub kind: Option<ComponentType>,
    /// `Cookie` request header that was sent
    pub cookie_sent: Option<String>,
    /// Bytes observed on the wire
    pub size: Option<u64>,
    pub resp_time_ms: Option<u64>,
    /// Request start, epoch milliseconds
    pub start_timestamp: Option<i64>,
    pub after_onload: Option<bool>,
    /// Decoded image dimensions when the body is not available
    pub image_size: Option<(u32, u32)>,
}

impl NetResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn kind(mut self, kind: ComponentType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn cookie_sent(mut self, cookie: impl Into<String>) -> Self {
        self.cookie_sent = Some(cookie.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

mod body_text {
    use super::*;

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.into_bytes())
    }
}

/// Metadata request for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    pub id: ComponentId,
    /// Absolute URL
    pub url: String,
    pub kind: ComponentType,
    pub is_image: bool,
}

pub(crate) struct Reply {
    pub(crate) id: ComponentId,
    pub(crate) response: Option<NetResponse>,
}

/// One-shot reply handle for an [`InfoRequest`].
///
/// Sending consumes the handle. A handle dropped without sending delivers
/// "no metadata" so the collection can still complete.
pub struct InfoReply {
    id: ComponentId,
    tx: Option<UnboundedSender<Reply>>,
}

impl InfoReply {
    pub(crate) fn new(id: ComponentId, tx: UnboundedSender<Reply>) -> Self {
        Self { id, tx: Some(tx) }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Delivers the response. Ignored if the collection is gone.
    pub fn send(mut self, response: NetResponse) {
        self.deliver(Some(response));
    }

    fn deliver(&mut self, response: Option<NetResponse>) {
        if let Some(tx) = self.tx.take() {
            // A closed channel means the collection was dropped; nothing to do
            let _ = tx.send(Reply {
                id: self.id,
                response,
            });
        }
    }
}

impl Drop for InfoReply {
    fn drop(&mut self) {
        self.deliver(None);
    }
}

impl std::fmt::Debug for InfoReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoReply")
            .field("id", &self.id)
            .field("pending", &self.tx.is_some())
            .finish()
    }
}

/// Source of network metadata.
pub trait NetInfoFetcher: Send + Sync {
    /// Starts a metadata lookup. Must not block; answer through `reply`.
    fn request(&self, request: InfoRequest, reply: InfoReply);
}

/// Fetcher backed by a map of already captured responses.
///
/// Answers synchronously. Unknown URLs get no metadata.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, NetResponse>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the response for `url`.
    pub fn with(mut self, url: impl Into<String>, response: NetResponse) -> Self {
        self.insert(url, response);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, response: NetResponse) {
        self.responses.insert(url.into(), response);
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl NetInfoFetcher for StaticFetcher {
    fn request(&self, request: InfoRequest, reply: InfoReply) {
        if let Some(response) = self.responses.get(&request.url) {
            reply.send(response.clone());
        }
    }
}
