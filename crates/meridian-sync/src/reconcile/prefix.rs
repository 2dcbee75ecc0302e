// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Prefix reconciliation and client-network refcounting.
//!
//! A network announced by exactly one router is a client network. Once a
//! second router announces it the network is excluded, and it stays excluded
//! until every announcement is withdrawn. Host routes are tracked as
//! announcements but never counted.

use std::collections::HashMap;

use meridian_cache::Cache;
use meridian_model::Prefix;
use tracing::{debug, error};

use crate::error::ReconcileError;

/// Applies prefix events and owns the per-network announcement counts.
#[derive(Debug, Clone, Default)]
pub struct PrefixReconciler {
    prefix_counts: HashMap<String, usize>,
}

impl PrefixReconciler {
    /// Empty reconciler with no announcements counted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live announcements for `network` (`address/length`).
    pub fn count(&self, network: &str) -> usize {
        self.prefix_counts.get(network).copied().unwrap_or(0)
    }

    /// Record an announcement.
    pub fn add(&mut self, prefix: Prefix, cache: &mut Cache) -> Result<(), ReconcileError> {
        let network = prefix.network();

        if let Some(known) = cache.prefix(&prefix.key) {
            if known.network() == network {
                debug!(key = %prefix.key, %network, "prefix refreshed");
                let holds_status = cache
                    .client_network(&network)
                    .is_some_and(|p| p.key == prefix.key);
                if holds_status {
                    cache.store_client_network(prefix);
                } else {
                    cache.store_prefix(prefix);
                }
                return Ok(());
            }
            // Same announcement moved to another network.
            let key = prefix.key.clone();
            self.delete(&key, cache)?;
        }

        if prefix.is_host_route() {
            cache.store_prefix(prefix);
            return Ok(());
        }
        let count = self.prefix_counts.entry(network.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            debug!(key = %prefix.key, %network, "client network");
            cache.store_client_network(prefix);
        } else {
            if let Some(previous) = cache.remove_client_network(&network) {
                debug!(%network, %previous, announcers = *count, "network is multi-homed");
            }
            cache.store_prefix(prefix);
        }
        Ok(())
    }

    /// Withdraw an announcement.
    pub fn delete(&mut self, key: &str, cache: &mut Cache) -> Result<(), ReconcileError> {
        let Some(prefix) = cache.remove_prefix(key) else {
            return Err(ReconcileError::UnknownPrefix(key.to_owned()));
        };
        if prefix.is_host_route() {
            return Ok(());
        }
        let network = prefix.network();
        let Some(count) = self.prefix_counts.get_mut(&network) else {
            return Err(ReconcileError::UnsyncedPrefixCount {
                key: key.to_owned(),
                network,
            });
        };
        if *count > 1 {
            *count -= 1;
        } else {
            self.prefix_counts.remove(&network);
            cache.remove_client_network(&network);
        }
        Ok(())
    }

    /// Bulk-add a prefix snapshot. Host routes are skipped and failures are
    /// logged. Returns how many announcements were recorded.
    pub fn process_prefixes(
        &mut self,
        prefixes: impl IntoIterator<Item = Prefix>,
        cache: &mut Cache,
    ) -> usize {
        let mut added = 0;
        for prefix in prefixes.into_iter().filter(|p| !p.is_host_route()) {
            let key = prefix.key.clone();
            match self.add(prefix, cache) {
                Ok(()) => added += 1,
                Err(err) => error!(%key, %err, "prefix skipped during bulk load"),
            }
        }
        added
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use meridian_dry_tests::PrefixBuilder;

    const NET: &str = "2001:db8:b::/64";

    fn announce(key: &str, router: &str) -> Prefix {
        PrefixBuilder::new(key, router, "2001:db8:b::", 64).build()
    }

    #[test]
    fn refresh_does_not_double_count() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();

        assert_eq!(prefixes.count(NET), 1);
        assert_eq!(cache.client_network(NET).unwrap().key, "pa");
    }

    #[test]
    fn second_announcer_excludes_network() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();
        prefixes.add(announce("pb", "B"), &mut cache).unwrap();

        assert_eq!(prefixes.count(NET), 2);
        assert!(cache.client_network(NET).is_none());
        assert!(cache.prefix("pa").is_some());
    }

    #[test]
    fn delete_unknown_prefix_errors() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        let err = prefixes.delete("ghost", &mut cache).unwrap_err();
        assert_eq!(err, ReconcileError::UnknownPrefix("ghost".into()));
        assert!(!err.is_validation());
    }

    #[test]
    fn delete_without_count_is_unsynced() {
        let mut cache = Cache::new();
        cache.store_prefix(announce("pa", "A"));
        let mut prefixes = PrefixReconciler::new();

        let err = prefixes.delete("pa", &mut cache).unwrap_err();
        assert!(matches!(err, ReconcileError::UnsyncedPrefixCount { .. }));
    }

    #[test]
    fn moved_announcement_recounts_both_networks() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();
        prefixes
            .add(PrefixBuilder::new("pa", "A", "2001:db8:c::", 64).build(), &mut cache)
            .unwrap();

        assert_eq!(prefixes.count(NET), 0);
        assert_eq!(prefixes.count("2001:db8:c::/64"), 1);
        assert!(cache.client_network(NET).is_none());
    }

    #[test]
    fn announcement_narrowed_to_host_route_withdraws_its_network() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();
        let host = PrefixBuilder::new("pa", "A", "2001:db8:b::1", 128).build();
        prefixes.add(host, &mut cache).unwrap();

        assert_eq!(prefixes.count(NET), 0);
        assert!(cache.client_network(NET).is_none());
        assert!(cache.prefix("pa").unwrap().is_host_route());

        prefixes.delete("pa", &mut cache).unwrap();
        assert!(cache.prefix("pa").is_none());
        prefixes.add(announce("pb", "B"), &mut cache).unwrap();
        assert_eq!(cache.client_network(NET).unwrap().key, "pb");
    }

    #[test]
    fn host_route_widened_to_network_is_counted() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        let host = PrefixBuilder::new("pa", "A", "2001:db8:b::1", 128).build();
        prefixes.add(host, &mut cache).unwrap();
        prefixes.add(announce("pa", "A"), &mut cache).unwrap();

        assert_eq!(prefixes.count(NET), 1);
        assert_eq!(cache.client_network(NET).unwrap().key, "pa");
    }

    #[test]
    fn host_routes_are_never_client_networks() {
        let mut cache = Cache::new();
        let mut prefixes = PrefixReconciler::new();
        let loopback = PrefixBuilder::new("lo", "A", "2001:db8::1", 128).build();
        let added = prefixes
            .process_prefixes([loopback.clone(), announce("pa", "A")], &mut cache);
        assert_eq!(added, 1);

        prefixes.add(loopback, &mut cache).unwrap();
        assert_eq!(prefixes.count("2001:db8::1/128"), 0);
        assert!(cache.client_network("2001:db8::1/128").is_none());
        prefixes.delete("lo", &mut cache).unwrap();
    }
}
