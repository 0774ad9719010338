//! Memoized per-component text analysis.
//!
//! Several rules scan the same stylesheet and script bodies. The results are
//! pure functions of the body, so they are cached by component id outside the
//! component itself.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::component::{Component, ComponentId};
use crate::rules::text::{
    count_alpha_image_loader_filters, count_expressions, is_minified, FilterCount,
};

/// Cache of derived values keyed by component id.
#[derive(Debug, Default)]
pub struct DerivedCache {
    minified: Mutex<HashMap<ComponentId, bool>>,
    expressions: Mutex<HashMap<ComponentId, usize>>,
    filters: Mutex<HashMap<ComponentId, FilterCount>>,
}

impl DerivedCache {
    /// Whether the component body is minified.
    pub fn minified(&self, component: &Component) -> bool {
        memoize(&self.minified, component.id, || {
            is_minified(&component.body_text())
        })
    }

    /// Number of CSS expressions in the component body.
    pub fn expression_count(&self, component: &Component) -> usize {
        memoize(&self.expressions, component.id, || {
            count_expressions(&component.body_text())
        })
    }

    /// AlphaImageLoader filters in the component body.
    pub fn filter_count(&self, component: &Component) -> FilterCount {
        memoize(&self.filters, component.id, || {
            count_alpha_image_loader_filters(&component.body_text())
        })
    }

    pub(crate) fn clear(&self) {
        lock(&self.minified).clear();
        lock(&self.expressions).clear();
        lock(&self.filters).clear();
    }
}

fn lock<T>(map: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

fn memoize<T: Copy>(
    map: &Mutex<HashMap<ComponentId, T>>,
    id: ComponentId,
    compute: impl FnOnce() -> T,
) -> T {
    if let Some(value) = lock(map).get(&id) {
        return *value;
    }
    // Computed outside the lock; a concurrent duplicate computes the same value
    let value = compute();
    *lock(map).entry(id).or_insert(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, NetResponse};
    use chrono::Utc;

    fn css(id: ComponentId, body: &str) -> Component {
        let mut c = Component::new(id, format!("http://ex.com/{id}.css"), ComponentType::Css, None);
        c.populate(Some(NetResponse::new(200).body(body)), None, Utc::now());
        c
    }

    #[test]
    fn test_values_are_cached_per_id() {
        let cache = DerivedCache::default();
        let first = css(1, "a{width:expression(1)}");
        assert_eq!(cache.expression_count(&first), 1);

        // Same id, different body: cached value wins
        let changed = css(1, "a{color:red}");
        assert_eq!(cache.expression_count(&changed), 1);

        cache.clear();
        assert_eq!(cache.expression_count(&changed), 0);
    }

    #[test]
    fn test_minified_and_filters() {
        let cache = DerivedCache::default();
        let c = css(2, "a{_filter:AlphaImageLoader(src=x);}");
        assert!(cache.minified(&c));
        assert_eq!(cache.filter_count(&c).hack, 1);
    }
}
