// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! SID reconciliation. SIDs live in the cache only.

use meridian_cache::Cache;
use meridian_model::Sid;
use tracing::debug;

/// Applies SID events. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidReconciler;

impl SidReconciler {
    /// Store `sid`, replacing any previous record with the same key.
    pub fn add(&self, sid: Sid, cache: &mut Cache) {
        cache.store_sid(sid);
    }

    /// Remove the SID for `key`.
    pub fn delete(&self, key: &str, cache: &mut Cache) {
        if cache.sid(key).is_none() {
            debug!(key, "sid not cached");
        }
        cache.remove_sid(key);
    }

    /// Bulk-store a SID snapshot.
    pub fn process_sids(&self, sids: impl IntoIterator<Item = Sid>, cache: &mut Cache) -> usize {
        sids.into_iter().fold(0, |n, sid| {
            self.add(sid, cache);
            n + 1
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use meridian_dry_tests::SidBuilder;

    #[test]
    fn add_overwrites_and_indexes_by_router_and_algorithm() {
        let mut cache = Cache::new();
        SidReconciler.add(SidBuilder::new("s1", "r1", "fc00:0:1::").build(), &mut cache);
        SidReconciler.add(
            SidBuilder::new("s1", "r1", "fc00:0:1::").algorithm(128).build(),
            &mut cache,
        );

        assert_eq!(cache.sid_key("r1", 128), Some("s1"));
        assert!(cache.sid_key("r1", 0).is_none());
    }

    #[test]
    fn delete_unknown_is_harmless() {
        let mut cache = Cache::new();
        SidReconciler.delete("ghost", &mut cache);
        assert!(cache.sid("ghost").is_none());
    }

    #[test]
    fn process_sids_counts() {
        let mut cache = Cache::new();
        let n = SidReconciler.process_sids(
            [
                SidBuilder::new("s1", "r1", "fc00:0:1::").build(),
                SidBuilder::new("s2", "r2", "fc00:0:2::").build(),
            ],
            &mut cache,
        );
        assert_eq!(n, 2);
        assert_eq!(cache.sids_for_router("r2").len(), 1);
    }
}
