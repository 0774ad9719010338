//! Request and byte statistics for a page.
//!
//! Statistics come in two flavors: an empty cache, where every component is
//! fetched, and a primed cache, where components with a far-future expiry are
//! served locally and components with an old `Last-Modified` only cost a
//! conditional request.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::collection::ComponentCollection;
use crate::component::{Component, ComponentType};
use crate::config::{EngineConfig, DEFAULT_MIN_FUTURE_EXPIRES_SECS};

/// Count and bytes for one component type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub count: usize,
    pub size: u64,
}

/// Statistics over every component of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    pub primed_cache: bool,
    pub num_requests: usize,
    pub total_size: u64,
    /// Types in first-seen order
    pub by_type: IndexMap<ComponentType, TypeStats>,
}

impl PageStats {
    /// Computes statistics for an empty or a primed browser cache.
    ///
    /// The primed cache honours `config.min_future_expires_seconds` as the
    /// far-future horizon, falling back to the default when it is not positive.
    pub fn compute(cset: &ComponentCollection, primed_cache: bool, config: &EngineConfig) -> Self {
        let horizon = if config.min_future_expires_seconds > 0 {
            config.min_future_expires_seconds
        } else {
            DEFAULT_MIN_FUTURE_EXPIRES_SECS
        };
        Self::compute_at(cset, primed_cache, horizon, Utc::now())
    }

    /// As [`PageStats::compute`] with an explicit horizon in seconds and clock.
    pub fn compute_at(
        cset: &ComponentCollection,
        primed_cache: bool,
        min_future_expires_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let mut stats = PageStats {
            primed_cache,
            ..Default::default()
        };
        for component in cset.components() {
            if primed_cache && component.has_far_future_expiry_at(min_future_expires_secs, now) {
                continue;
            }
            let size = if primed_cache && component.has_old_modified_date_at(now) {
                0
            } else {
                transfer_size(component)
            };
            stats.num_requests += 1;
            stats.total_size += size;
            let entry = stats.by_type.entry(component.kind).or_default();
            entry.count += 1;
            entry.size += size;
        }
        stats
    }

    pub fn count(&self, kind: ComponentType) -> usize {
        self.by_type.get(&kind).map_or(0, |t| t.count)
    }

    pub fn size(&self, kind: ComponentType) -> u64 {
        self.by_type.get(&kind).map_or(0, |t| t.size)
    }
}

/// Bytes on the wire: the compressed size when compressed.
fn transfer_size(component: &Component) -> u64 {
    if component.compressed.is_compressed() {
        component.size_compressed.unwrap_or(0)
    } else {
        component.size
    }
}
