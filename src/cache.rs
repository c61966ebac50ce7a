use std::time::Duration;

use moka::sync::Cache;

use crate::{config::EngineConfig, schemas::ListingInfo};

/// TTL-bounded cache for listing rule profiles, sitting between the
/// integration layer and property-configuration storage. The calculation
/// services never read it — they take a plain map — so cached and fresh
/// inputs compute the same statement.
pub struct ProfileCache {
    inner: Cache<i64, ListingInfo>,
}

impl ProfileCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Duration::from_secs(config.profile_cache_ttl_seconds),
            config.profile_cache_max_entries,
        )
    }

    pub fn get(&self, property_id: i64) -> Option<ListingInfo> {
        self.inner.get(&property_id)
    }

    pub fn insert(&self, profile: ListingInfo) {
        self.inner.insert(profile.property_id, profile);
    }

    /// Serve a cached profile or run `loader` and remember its result.
    /// A `None` from the loader is not cached; a property that gains a
    /// profile later must not be pinned as missing.
    pub fn get_or_load(
        &self,
        property_id: i64,
        loader: impl FnOnce() -> Option<ListingInfo>,
    ) -> Option<ListingInfo> {
        if let Some(hit) = self.inner.get(&property_id) {
            return Some(hit);
        }
        let loaded = loader()?;
        self.inner.insert(property_id, loaded.clone());
        Some(loaded)
    }

    /// Drop one property's entry, e.g. after its rule profile is edited.
    pub fn invalidate(&self, property_id: i64) {
        self.inner.invalidate(&property_id);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ProfileCache;
    use crate::schemas::ListingInfo;

    fn profile(property_id: i64) -> ListingInfo {
        ListingInfo {
            property_id,
            pm_fee_percentage: Some(15.0),
            ..ListingInfo::default()
        }
    }

    #[test]
    fn loads_once_then_serves_from_cache() {
        let cache = ProfileCache::new(Duration::from_secs(60), 100);
        let mut loads = 0;

        let first = cache.get_or_load(7, || {
            loads += 1;
            Some(profile(7))
        });
        assert!(first.is_some());

        let second = cache.get_or_load(7, || {
            loads += 1;
            Some(profile(7))
        });
        assert_eq!(second.unwrap().property_id, 7);
        assert_eq!(loads, 1);
    }

    #[test]
    fn missing_profiles_are_not_pinned() {
        let cache = ProfileCache::new(Duration::from_secs(60), 100);
        assert!(cache.get_or_load(9, || None).is_none());
        assert!(cache.get_or_load(9, || Some(profile(9))).is_some());
    }

    #[test]
    fn invalidation_forces_a_reload() {
        let cache = ProfileCache::new(Duration::from_secs(60), 100);
        cache.insert(profile(3));
        assert!(cache.get(3).is_some());

        cache.invalidate(3);
        assert!(cache.get(3).is_none());

        cache.insert(profile(3));
        cache.insert(profile(4));
        cache.invalidate_all();
        assert!(cache.get(3).is_none());
        assert!(cache.get(4).is_none());
    }
}
