//! Component collection for one page load.
//!
//! The discovery side calls [`ComponentCollection::add_component`] for every
//! resource reference it finds. Each new URL becomes a [`Component`] and a
//! metadata request to the configured [`NetInfoFetcher`]. Replies come back
//! over a channel and are applied by [`ComponentCollection::pump`] or
//! [`ComponentCollection::wait_complete`]. The collection completes once
//! discovery has ended and no reply is outstanding.

mod memo;
mod resolve;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use log::{debug, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::component::{
    Component, ComponentId, ComponentType, ElementHint, InfoReply, InfoRequest, NetInfoFetcher,
    Reply,
};
use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventSink, LogSink};

pub use memo::DerivedCache;
pub use resolve::{canonicalize, has_allowed_scheme, has_required_host, resolve_component_url};

/// Enrichment state of one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    Requested,
    Received,
}

#[derive(Debug, Clone, Copy)]
struct UrlInfo {
    id: ComponentId,
    state: FetchState,
    count: usize,
}

/// Lookup filters applied by [`ComponentCollection::by_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintFilters {
    pub exclude_after_onload: bool,
    pub exclude_beacons: bool,
}

impl Default for LintFilters {
    fn default() -> Self {
        Self {
            exclude_after_onload: true,
            exclude_beacons: true,
        }
    }
}

impl From<&EngineConfig> for LintFilters {
    fn from(config: &EngineConfig) -> Self {
        Self {
            exclude_after_onload: config.exclude_after_onload,
            exclude_beacons: config.exclude_beacons_from_lint,
        }
    }
}

/// Enrichment progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Distinct components registered
    pub total: usize,
    /// Components whose metadata has been applied
    pub received: usize,
}

/// All components of one page load.
pub struct ComponentCollection {
    components: Vec<Component>,
    info: HashMap<String, UrlInfo>,
    empty_urls: IndexMap<ComponentType, usize>,
    next_id: ComponentId,
    outstanding: usize,
    peel_done: bool,
    fetch_done: bool,
    onload_timestamp: Option<i64>,
    filters: LintFilters,
    memo: DerivedCache,
    fetcher: Arc<dyn NetInfoFetcher>,
    events: Arc<dyn EventSink>,
    reply_tx: UnboundedSender<Reply>,
    reply_rx: UnboundedReceiver<Reply>,
}

impl ComponentCollection {
    /// Creates an empty collection that requests metadata from `fetcher`.
    ///
    /// Events go to a [`LogSink`]; see [`ComponentCollection::with_events`].
    pub fn new(fetcher: Arc<dyn NetInfoFetcher>) -> Self {
        let (reply_tx, reply_rx) = unbounded_channel();
        Self {
            components: Vec::new(),
            info: HashMap::new(),
            empty_urls: IndexMap::new(),
            next_id: 1,
            outstanding: 0,
            peel_done: false,
            fetch_done: false,
            onload_timestamp: None,
            filters: LintFilters::default(),
            memo: DerivedCache::default(),
            fetcher,
            events: Arc::new(LogSink::new()),
            reply_tx,
            reply_rx,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_filters(mut self, filters: LintFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Page onload time (epoch milliseconds) used to flag late components.
    pub fn with_onload_timestamp(mut self, timestamp: i64) -> Self {
        self.onload_timestamp = Some(timestamp);
        self
    }

    pub fn filters(&self) -> LintFilters {
        self.filters
    }

    pub fn set_filters(&mut self, filters: LintFilters) {
        self.filters = filters;
    }

    /// Registers a discovered resource reference.
    ///
    /// # Arguments
    ///
    /// * `url` - The reference as written (may be relative)
    /// * `kind` - What the discovery side thinks the resource is
    /// * `base_href` - Absolute URL `url` is relative to
    /// * `hint` - Declared element size, for images
    ///
    /// # Returns
    ///
    /// The id of the new or already registered component. `None` when the URL
    /// is empty (tallied as empty-URL evidence for `kind`), uses an ignored
    /// scheme, or is an `http(s)` URL without a host.
    pub fn add_component(
        &mut self,
        url: &str,
        kind: ComponentType,
        base_href: &str,
        hint: Option<ElementHint>,
    ) -> Option<ComponentId> {
        if url.is_empty() {
            *self.empty_urls.entry(kind).or_insert(0) += 1;
            return None;
        }
        let Some(absolute) = resolve_component_url(url, base_href) else {
            self.events.emit(&EngineEvent::InvalidResource {
                url: url.to_string(),
            });
            return None;
        };

        if let Some(info) = self.info.get_mut(&absolute) {
            info.count += 1;
            return Some(info.id);
        }

        Some(self.insert_new(absolute, kind, hint))
    }

    /// Like [`ComponentCollection::add_component`] but returns `None` when
    /// the resolved URL is already registered.
    pub fn add_component_if_absent(
        &mut self,
        url: &str,
        kind: ComponentType,
        base_href: &str,
    ) -> Option<ComponentId> {
        if !url.is_empty() {
            if let Some(absolute) = resolve_component_url(url, base_href) {
                if self.info.contains_key(&absolute) {
                    return None;
                }
            }
        }
        self.add_component(url, kind, base_href, None)
    }

    fn insert_new(
        &mut self,
        url: String,
        kind: ComponentType,
        hint: Option<ElementHint>,
    ) -> ComponentId {
        let id = self.next_id;
        self.next_id += 1;
        self.components
            .push(Component::new(id, url.clone(), kind, hint));
        self.info.insert(
            url.clone(),
            UrlInfo {
                id,
                state: FetchState::Requested,
                count: 1,
            },
        );
        self.outstanding += 1;
        if self.fetch_done {
            warn!("Component {} added after the collection completed", url);
        }
        debug!("Component {} added: {} ({})", id, url, kind);

        let request = InfoRequest {
            id,
            url,
            kind,
            is_image: kind.is_image(),
        };
        let reply = InfoReply::new(id, self.reply_tx.clone());
        self.fetcher.request(request, reply);
        id
    }

    /// Applies every reply that has already arrived, without waiting.
    ///
    /// Returns the number of replies applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.apply_reply(reply);
            applied += 1;
        }
        self.check_fetch_done();
        applied
    }

    /// Marks discovery as finished.
    ///
    /// Completion fires now if nothing is outstanding, otherwise when the last
    /// reply arrives.
    pub fn notify_peel_done(&mut self) {
        self.peel_done = true;
        self.pump();
    }

    /// Waits until every component has its metadata.
    ///
    /// Waiting ends discovery: it implies [`ComponentCollection::notify_peel_done`].
    pub async fn wait_complete(&mut self) {
        if !self.peel_done {
            self.notify_peel_done();
        }
        while !self.fetch_done {
            match self.reply_rx.recv().await {
                Some(reply) => {
                    self.apply_reply(reply);
                    self.check_fetch_done();
                }
                None => {
                    // The collection owns a sender, so this is unreachable in practice
                    warn!("Metadata channel closed with {} outstanding", self.outstanding);
                    break;
                }
            }
        }
    }

    /// Whether completion has fired.
    pub fn is_complete(&self) -> bool {
        self.fetch_done
    }

    fn apply_reply(&mut self, reply: Reply) {
        let Some(index) = self.index_of(reply.id) else {
            debug!("Ignoring metadata for unknown component {}", reply.id);
            return;
        };
        if reply.response.is_none() {
            self.events.emit(&EngineEvent::ComponentFetchError {
                url: self.components[index].url.clone(),
            });
        }

        let redirect =
            self.components[index].populate(reply.response, self.onload_timestamp, Utc::now());
        let url = self.components[index].url.clone();

        if let Some(info) = self.info.get_mut(&url) {
            if info.state == FetchState::Requested {
                info.state = FetchState::Received;
                self.outstanding = self.outstanding.saturating_sub(1);
            }
        }

        if let Some(target) = redirect {
            if let Some(new_id) = self.add_component_if_absent(&target.location, target.kind, &url)
            {
                if let Some(new_index) = self.index_of(new_id) {
                    self.components[new_index].after_onload = target.after_onload;
                }
            }
        }

        let progress = self.progress();
        self.events.emit(&EngineEvent::FetchProgress {
            total: progress.total,
            received: progress.received,
            last_url: url,
        });
    }

    fn check_fetch_done(&mut self) {
        if self.peel_done && self.outstanding == 0 && !self.fetch_done {
            self.fetch_done = true;
            self.events.emit(&EngineEvent::FetchDone {
                components: self.components.len(),
            });
        }
    }

    fn index_of(&self, id: ComponentId) -> Option<usize> {
        self.components.binary_search_by_key(&id, |c| c.id).ok()
    }

    /// Component by id.
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.index_of(id).map(|index| &self.components[index])
    }

    /// Component registered for an absolute URL.
    pub fn get_by_url(&self, url: &str) -> Option<&Component> {
        self.info.get(url).and_then(|info| self.get(info.id))
    }

    /// Number of times a URL was referenced (0 if unknown).
    pub fn occurrences(&self, url: &str) -> usize {
        self.info.get(url).map_or(0, |info| info.count)
    }

    /// Components of the given kinds using the configured filters.
    ///
    /// A URL referenced N times appears N times.
    pub fn by_type(&self, kinds: &[ComponentType]) -> Vec<&Component> {
        self.by_type_with(
            kinds,
            !self.filters.exclude_after_onload,
            !self.filters.exclude_beacons,
        )
    }

    /// Components of the given kinds with explicit filters.
    pub fn by_type_with(
        &self,
        kinds: &[ComponentType],
        include_after_onload: bool,
        include_beacons: bool,
    ) -> Vec<&Component> {
        let mut found = Vec::new();
        for component in &self.components {
            if !kinds.contains(&component.kind)
                || (component.is_beacon && !include_beacons)
                || (component.after_onload && !include_after_onload)
            {
                continue;
            }
            let count = self.occurrences(&component.url).max(1);
            found.extend(std::iter::repeat(component).take(count));
        }
        found
    }

    /// The first document component, if any.
    pub fn doc_component(&self) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.kind == ComponentType::Doc)
    }

    /// All distinct components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Empty `src`/`href` references tallied per kind, in first-seen order.
    pub fn empty_urls(&self) -> &IndexMap<ComponentType, usize> {
        &self.empty_urls
    }

    pub fn progress(&self) -> FetchProgress {
        let received = self
            .info
            .values()
            .filter(|info| info.state == FetchState::Received)
            .count();
        FetchProgress {
            total: self.info.len(),
            received,
        }
    }

    /// Memoized text analysis of component bodies.
    pub fn memo(&self) -> &DerivedCache {
        &self.memo
    }

    /// Drops all components and counters.
    ///
    /// Ids keep increasing after a clear. Replies still in flight are ignored.
    pub fn clear(&mut self) {
        if self.outstanding > 0 {
            warn!(
                "Clearing component collection with {} metadata requests outstanding",
                self.outstanding
            );
        }
        self.components.clear();
        self.info.clear();
        self.empty_urls.clear();
        self.memo.clear();
        self.outstanding = 0;
        self.peel_done = false;
        self.fetch_done = false;
    }
}

impl std::fmt::Debug for ComponentCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCollection")
            .field("components", &self.components.len())
            .field("outstanding", &self.outstanding)
            .field("peel_done", &self.peel_done)
            .field("fetch_done", &self.fetch_done)
            .finish()
    }
}
