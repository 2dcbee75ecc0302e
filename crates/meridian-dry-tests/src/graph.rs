// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph double that records subgraph recomputations.

use std::collections::BTreeMap;

use meridian_graph::{Graph, GraphEdge, GraphError, GraphNode, GraphStore};
use meridian_model::WeightKind;

/// [`GraphStore`] wrapper counting [`Graph::update_sub_graphs`] calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingGraph {
    inner: GraphStore,
    recomputes: usize,
}

impl RecordingGraph {
    /// Empty graph with a zero counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `update_sub_graphs` calls so far.
    pub const fn recomputes(&self) -> usize {
        self.recomputes
    }

    /// The wrapped store.
    pub const fn store(&self) -> &GraphStore {
        &self.inner
    }
}

impl Graph for RecordingGraph {
    fn node_exists(&self, id: &str) -> bool {
        self.inner.node_exists(id)
    }

    fn node(&self, id: &str) -> Option<&GraphNode> {
        self.inner.node(id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.inner.node_mut(id)
    }

    fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        self.inner.add_node(node)
    }

    fn delete_node(&mut self, id: &str) -> Result<GraphNode, GraphError> {
        self.inner.delete_node(id)
    }

    fn edge_exists(&self, key: &str) -> bool {
        self.inner.edge_exists(key)
    }

    fn edge(&self, key: &str) -> Option<&GraphEdge> {
        self.inner.edge(key)
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Result<(), GraphError> {
        self.inner.add_edge(edge)
    }

    fn delete_edge(&mut self, key: &str) -> Result<GraphEdge, GraphError> {
        self.inner.delete_edge(key)
    }

    fn edge_keys(&self) -> Vec<String> {
        self.inner.edge_keys()
    }

    fn weight(&self, key: &str, kind: WeightKind) -> Result<f64, GraphError> {
        self.inner.weight(key, kind)
    }

    fn set_weight(&mut self, key: &str, kind: WeightKind, value: f64) -> Result<(), GraphError> {
        self.inner.set_weight(key, kind, value)
    }

    fn all_weights(&self, key: &str) -> Result<&BTreeMap<WeightKind, f64>, GraphError> {
        self.inner.all_weights(key)
    }

    fn update_sub_graphs(&mut self) {
        self.recomputes += 1;
        self.inner.update_sub_graphs();
    }
}
