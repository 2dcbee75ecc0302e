// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! meridian-cache: authoritative lookup cache for topology entities.
//!
//! The cache keeps nodes, segment identifiers, prefix announcements and
//! service SIDs in primary maps keyed by telemetry key, plus secondary
//! indices for router-id and network lookups.
//!
//! Invariants
//! - Every secondary index entry references a key present in its primary map.
//! - Removing a primary entry removes every index entry pointing at it. The
//!   `&mut Cache` borrow (held through [`SharedCache`]) makes this atomic for
//!   readers.
//! - An index slot taken over by a newer key is left alone when the older
//!   primary entry is removed.
#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use meridian_model::{Node, Prefix, Sid};

/// Lock handle shared by the network processor and other cache users such
/// as the service-discovery monitor.
pub type SharedCache = Arc<tokio::sync::Mutex<Cache>>;

/// Topology lookup cache.
#[derive(Debug, Default)]
pub struct Cache {
    nodes: HashMap<String, Node>,
    /// IGP router id to node key.
    node_keys_by_router: HashMap<String, String>,
    sids: HashMap<String, Sid>,
    /// IGP router id to (Flex-Algo to SID key).
    sid_keys_by_router: HashMap<String, BTreeMap<u8, String>>,
    /// Every known prefix announcement, client network or not.
    prefixes: HashMap<String, Prefix>,
    /// `address/length` to the key of its single announcer.
    client_networks: HashMap<String, String>,
    /// Service name to the SIDs currently serving it.
    service_sids: HashMap<String, BTreeSet<String>>,
}

impl Cache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache behind a [`SharedCache`] lock.
    pub fn shared() -> SharedCache {
        Arc::new(tokio::sync::Mutex::new(Self::new()))
    }

    // ── Nodes ───────────────────────────────────────────────────────────

    /// Insert or overwrite a node, keeping the router index in step.
    pub fn store_node(&mut self, node: Node) {
        if let Some(previous) = self.nodes.get(&node.key) {
            if previous.igp_router_id != node.igp_router_id {
                remove_if_points_to(
                    &mut self.node_keys_by_router,
                    &previous.igp_router_id,
                    &node.key,
                );
            }
        }
        self.node_keys_by_router
            .insert(node.igp_router_id.clone(), node.key.clone());
        self.nodes.insert(node.key.clone(), node);
    }

    /// Remove a node and its router index entry.
    pub fn remove_node(&mut self, key: &str) -> Option<Node> {
        let node = self.nodes.remove(key)?;
        remove_if_points_to(&mut self.node_keys_by_router, &node.igp_router_id, key);
        Some(node)
    }

    /// Node by telemetry key.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Node key currently indexed for a router id.
    pub fn node_key_by_router_id(&self, igp_router_id: &str) -> Option<&str> {
        self.node_keys_by_router
            .get(igp_router_id)
            .map(String::as_str)
    }

    /// Node by IGP router id.
    pub fn node_by_router_id(&self, igp_router_id: &str) -> Option<&Node> {
        self.node_key_by_router_id(igp_router_id)
            .and_then(|key| self.nodes.get(key))
    }

    /// Number of cached nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── SIDs ────────────────────────────────────────────────────────────

    /// Insert or overwrite a SID. The `(router, algorithm)` slot now points
    /// at this key.
    pub fn store_sid(&mut self, sid: Sid) {
        if let Some(previous) = self.sids.get(&sid.key) {
            if previous.igp_router_id != sid.igp_router_id || previous.algorithm != sid.algorithm {
                let (router, algorithm) = (previous.igp_router_id.clone(), previous.algorithm);
                self.unindex_sid(&router, algorithm, &sid.key);
            }
        }
        self.sid_keys_by_router
            .entry(sid.igp_router_id.clone())
            .or_default()
            .insert(sid.algorithm, sid.key.clone());
        self.sids.insert(sid.key.clone(), sid);
    }

    /// Remove a SID. Removing an unknown key is a no-op.
    pub fn remove_sid(&mut self, key: &str) -> Option<Sid> {
        let sid = self.sids.remove(key)?;
        self.unindex_sid(&sid.igp_router_id, sid.algorithm, key);
        Some(sid)
    }

    /// SID by telemetry key.
    pub fn sid(&self, key: &str) -> Option<&Sid> {
        self.sids.get(key)
    }

    /// Active SID key for a router and Flex-Algo.
    pub fn sid_key(&self, igp_router_id: &str, algorithm: u8) -> Option<&str> {
        self.sid_keys_by_router
            .get(igp_router_id)
            .and_then(|by_algo| by_algo.get(&algorithm))
            .map(String::as_str)
    }

    /// Active SID for a router and Flex-Algo.
    pub fn sid_by_router_id(&self, igp_router_id: &str, algorithm: u8) -> Option<&Sid> {
        self.sid_key(igp_router_id, algorithm)
            .and_then(|key| self.sids.get(key))
    }

    /// All active SIDs of a router, ordered by algorithm.
    pub fn sids_for_router(&self, igp_router_id: &str) -> Vec<&Sid> {
        self.sid_keys_by_router
            .get(igp_router_id)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter_map(|key| self.sids.get(key))
            .collect()
    }

    fn unindex_sid(&mut self, igp_router_id: &str, algorithm: u8, key: &str) {
        if let Some(by_algo) = self.sid_keys_by_router.get_mut(igp_router_id) {
            if by_algo.get(&algorithm).is_some_and(|k| k == key) {
                by_algo.remove(&algorithm);
            }
            if by_algo.is_empty() {
                self.sid_keys_by_router.remove(igp_router_id);
            }
        }
    }

    // ── Prefixes and client networks ────────────────────────────────────

    /// Record a prefix announcement without client-network status.
    pub fn store_prefix(&mut self, prefix: Prefix) {
        self.prefixes.insert(prefix.key.clone(), prefix);
    }

    /// Forget a prefix announcement, and its client-network entry if this
    /// announcement held it.
    pub fn remove_prefix(&mut self, key: &str) -> Option<Prefix> {
        let prefix = self.prefixes.remove(key)?;
        remove_if_points_to(&mut self.client_networks, &prefix.network(), key);
        Some(prefix)
    }

    /// Prefix announcement by telemetry key.
    pub fn prefix(&self, key: &str) -> Option<&Prefix> {
        self.prefixes.get(key)
    }

    /// Record a prefix announcement and mark it as the client network for
    /// its `address/length`.
    pub fn store_client_network(&mut self, prefix: Prefix) {
        self.client_networks
            .insert(prefix.network(), prefix.key.clone());
        self.prefixes.insert(prefix.key.clone(), prefix);
    }

    /// Drop client-network status for `network`. The announcement itself
    /// stays known. Returns the key that held the status.
    pub fn remove_client_network(&mut self, network: &str) -> Option<String> {
        self.client_networks.remove(network)
    }

    /// Client network for `address/length`.
    pub fn client_network(&self, network: &str) -> Option<&Prefix> {
        self.client_networks
            .get(network)
            .and_then(|key| self.prefixes.get(key))
    }

    /// All current client networks.
    pub fn client_networks(&self) -> impl Iterator<Item = &Prefix> {
        self.client_networks
            .values()
            .filter_map(|key| self.prefixes.get(key))
    }

    // ── Service SIDs ────────────────────────────────────────────────────

    /// Register `sid` as serving `service`.
    pub fn store_service_sid(&mut self, service: &str, sid: &str) {
        self.service_sids
            .entry(service.to_owned())
            .or_default()
            .insert(sid.to_owned());
    }

    /// Withdraw `sid` from `service`. Returns whether it was registered.
    pub fn remove_service_sid(&mut self, service: &str, sid: &str) -> bool {
        let Some(sids) = self.service_sids.get_mut(service) else {
            return false;
        };
        let removed = sids.remove(sid);
        if sids.is_empty() {
            self.service_sids.remove(service);
        }
        removed
    }

    /// SIDs serving `service`, in address order.
    pub fn service_sids(&self, service: &str) -> Vec<String> {
        self.service_sids
            .get(service)
            .map(|sids| sids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True if `sid` is registered for `service`.
    pub fn does_service_sid_exist(&self, service: &str, sid: &str) -> bool {
        self.service_sids
            .get(service)
            .is_some_and(|sids| sids.contains(sid))
    }
}

fn remove_if_points_to(index: &mut HashMap<String, String>, slot: &str, key: &str) {
    if index.get(slot).is_some_and(|k| k == key) {
        index.remove(slot);
    }
}
