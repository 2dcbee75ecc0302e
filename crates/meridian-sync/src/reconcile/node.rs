// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node reconciliation.

use meridian_cache::Cache;
use meridian_graph::{Graph, GraphNode};
use meridian_model::Node;
use tracing::debug;

use crate::error::ReconcileError;

/// Applies node events. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeReconciler;

impl NodeReconciler {
    /// Add or update a node.
    ///
    /// An existing graph node (looked up by router id) is updated in place,
    /// which also fills in placeholders created by early link events. The
    /// cache entry is always overwritten. Returns whether the graph changed.
    pub fn upsert<G: Graph>(
        &self,
        node: Node,
        cache: &mut Cache,
        graph: &mut G,
    ) -> Result<bool, ReconcileError> {
        let changed = if let Some(existing) = graph.node_mut(&node.igp_router_id) {
            let changed =
                existing.name != node.name || existing.algorithms != node.sr_algorithms;
            existing.name.clone_from(&node.name);
            existing.algorithms.clone_from(&node.sr_algorithms);
            changed
        } else {
            graph.add_node(GraphNode {
                id: node.igp_router_id.clone(),
                name: node.name.clone(),
                algorithms: node.sr_algorithms.clone(),
            })?;
            true
        };
        cache.store_node(node);
        Ok(changed)
    }

    /// Delete a node by key.
    ///
    /// Unknown keys are a no-op. Cache and graph removal are independent:
    /// either may find nothing to remove. Returns whether the graph changed.
    pub fn delete<G: Graph>(
        &self,
        key: &str,
        cache: &mut Cache,
        graph: &mut G,
    ) -> Result<bool, ReconcileError> {
        let Some(node) = cache.remove_node(key) else {
            debug!(key, "node not cached; nothing to delete");
            return Ok(false);
        };
        if !graph.node_exists(&node.igp_router_id) {
            debug!(key, router = %node.igp_router_id, "node absent from graph");
            return Ok(false);
        }
        graph.delete_node(&node.igp_router_id)?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use meridian_dry_tests::NodeBuilder;
    use meridian_graph::GraphStore;

    #[test]
    fn upsert_creates_then_updates_in_place() {
        let mut cache = Cache::new();
        let mut graph = GraphStore::new();
        let reconciler = NodeReconciler;

        let node = NodeBuilder::new("r1").name("pe1").algorithms([128]).build();
        assert!(reconciler.upsert(node, &mut cache, &mut graph).unwrap());

        let renamed = NodeBuilder::new("r1").name("pe1-new").algorithms([128, 129]).build();
        assert!(reconciler.upsert(renamed, &mut cache, &mut graph).unwrap());

        let g = graph.node("r1").unwrap();
        assert_eq!(g.name, "pe1-new");
        assert_eq!(g.algorithms.len(), 2);
        assert_eq!(cache.node_by_router_id("r1").unwrap().name, "pe1-new");
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn identical_update_is_not_graph_affecting() {
        let mut cache = Cache::new();
        let mut graph = GraphStore::new();
        let node = NodeBuilder::new("r1").name("p1").build();
        NodeReconciler
            .upsert(node.clone(), &mut cache, &mut graph)
            .unwrap();
        assert!(!NodeReconciler.upsert(node, &mut cache, &mut graph).unwrap());
    }

    #[test]
    fn upsert_fills_placeholder() {
        let mut cache = Cache::new();
        let mut graph = GraphStore::new();
        graph.add_node(GraphNode::placeholder("r7")).unwrap();

        let node = NodeBuilder::new("r7").name("p7").algorithms([130]).build();
        NodeReconciler.upsert(node, &mut cache, &mut graph).unwrap();
        assert_eq!(graph.node("r7").unwrap().name, "p7");
    }

    #[test]
    fn delete_unknown_key_is_noop() {
        let mut cache = Cache::new();
        let mut graph = GraphStore::new();
        assert!(!NodeReconciler
            .delete("ghost", &mut cache, &mut graph)
            .unwrap());
    }

    #[test]
    fn delete_tolerates_missing_graph_node() {
        let mut cache = Cache::new();
        let mut graph = GraphStore::new();
        let node = NodeBuilder::new("r1").build();
        let key = node.key.clone();
        cache.store_node(node);

        assert!(!NodeReconciler.delete(&key, &mut cache, &mut graph).unwrap());
        assert!(cache.node(&key).is_none());
    }
}
