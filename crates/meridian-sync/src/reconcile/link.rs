// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Link reconciliation: graph edges and their ten weights.

use meridian_cache::Cache;
use meridian_graph::{Graph, GraphEdge, GraphNode};
use meridian_model::{Link, WeightKind};
use tracing::{debug, warn};

use crate::error::ReconcileError;

/// Outcome of an incremental link update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightUpdate {
    /// The edge did not exist and was created from the update.
    pub created: bool,
    /// Weights written with a new value.
    pub changed: Vec<WeightKind>,
    /// Raw weights reported as zero and left at their previous value.
    pub skipped: Vec<WeightKind>,
}

impl WeightUpdate {
    /// True when the graph was mutated.
    pub fn graph_changed(&self) -> bool {
        self.created || !self.changed.is_empty()
    }
}

/// Applies link events. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkReconciler;

/// Zero in a raw weight means the telemetry has not been populated yet.
/// Normalized weights are exempt.
fn is_unpopulated(kind: WeightKind, value: f64) -> bool {
    !kind.is_normalized() && value == 0.0
}

impl LinkReconciler {
    /// Create the edge for `link`.
    ///
    /// Idempotent: an existing edge is left untouched. Any zero raw weight
    /// rejects the link without creating anything. Missing endpoints are
    /// created from the cache, or as placeholders when the node event has
    /// not arrived yet. Returns whether the graph changed.
    pub fn add<G: Graph>(
        &self,
        link: &Link,
        cache: &Cache,
        graph: &mut G,
    ) -> Result<bool, ReconcileError> {
        if graph.edge_exists(&link.key) {
            debug!(key = %link.key, "edge already present");
            return Ok(false);
        }
        let weights = link.weights();
        if let Some(&(kind, _)) = weights.iter().find(|(k, v)| is_unpopulated(*k, *v)) {
            return Err(ReconcileError::ZeroWeight {
                key: link.key.clone(),
                kind,
            });
        }
        ensure_node(&link.igp_router_id, cache, graph)?;
        ensure_node(&link.remote_igp_router_id, cache, graph)?;
        graph.add_edge(GraphEdge::new(
            link.key.clone(),
            link.igp_router_id.clone(),
            link.remote_igp_router_id.clone(),
            weights,
        ))?;
        Ok(true)
    }

    /// Apply new telemetry to an existing edge, or create it when missing.
    ///
    /// Each weight is handled on its own: zero raw values are skipped and
    /// reported, unchanged values are not rewritten, everything else is
    /// written.
    pub fn update<G: Graph>(
        &self,
        link: &Link,
        cache: &Cache,
        graph: &mut G,
    ) -> Result<WeightUpdate, ReconcileError> {
        if !graph.edge_exists(&link.key) {
            let created = self.add(link, cache, graph)?;
            return Ok(WeightUpdate {
                created,
                ..WeightUpdate::default()
            });
        }

        let mut update = WeightUpdate::default();
        for (kind, value) in link.weights() {
            if is_unpopulated(kind, value) {
                update.skipped.push(kind);
                continue;
            }
            if graph.weight(&link.key, kind).ok() == Some(value) {
                continue;
            }
            graph.set_weight(&link.key, kind, value)?;
            update.changed.push(kind);
        }
        Ok(update)
    }

    /// Remove the edge for `key` if present. Returns whether it existed.
    pub fn delete<G: Graph>(&self, key: &str, graph: &mut G) -> Result<bool, ReconcileError> {
        if !graph.edge_exists(key) {
            debug!(key, "edge not present; nothing to delete");
            return Ok(false);
        }
        graph.delete_edge(key)?;
        Ok(true)
    }

    /// Bulk-add a full link snapshot, then recompute subgraphs once.
    ///
    /// Rejected links are logged and skipped. Returns how many edges were
    /// created.
    pub fn process_links<G: Graph>(&self, links: &[Link], cache: &Cache, graph: &mut G) -> usize {
        let mut added = 0;
        for link in links {
            match self.add(link, cache, graph) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(err) => warn!(key = %link.key, %err, "link skipped during bulk load"),
            }
        }
        graph.update_sub_graphs();
        added
    }
}

fn ensure_node<G: Graph>(router: &str, cache: &Cache, graph: &mut G) -> Result<(), ReconcileError> {
    if graph.node_exists(router) {
        return Ok(());
    }
    let node = cache.node_by_router_id(router).map_or_else(
        || {
            debug!(router, "creating placeholder node ahead of node event");
            GraphNode::placeholder(router)
        },
        |cached| GraphNode {
            id: router.to_owned(),
            name: cached.name.clone(),
            algorithms: cached.sr_algorithms.clone(),
        },
    );
    graph.add_node(node)?;
    Ok(())
}
