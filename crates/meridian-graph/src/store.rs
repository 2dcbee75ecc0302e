// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory graph store with forward/reverse adjacency and Flex-Algo subgraphs.

use std::collections::{BTreeMap, BTreeSet};

use meridian_model::WeightKind;

use crate::graph::{Graph, GraphError};
use crate::record::{GraphEdge, GraphNode, SubGraph};

/// Flex-Algo 0: plain SPF, implicitly supported by every router.
pub const FLEX_ALGO_SPF: u8 = 0;

/// In-memory [`Graph`] implementation.
///
/// Iteration order is deterministic (`BTreeMap`), which keeps subgraph
/// rebuilds and test assertions stable across runs.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Router id to node record.
    nodes: BTreeMap<String, GraphNode>,
    /// Link key to edge record.
    edges: BTreeMap<String, GraphEdge>,
    /// Source router id to outbound edge keys.
    edges_from: BTreeMap<String, BTreeSet<String>>,
    /// Destination router id to inbound edge keys.
    ///
    /// Lets `delete_node` drop inbound edges without scanning every edge.
    edges_to: BTreeMap<String, BTreeSet<String>>,
    /// Subgraphs as of the last `update_sub_graphs` call.
    sub_graphs: BTreeMap<u8, SubGraph>,
    /// Number of subgraph rebuilds performed.
    generation: u64,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over all nodes in router-id order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Iterate over all edges in key order.
    pub fn iter_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    /// Edges leaving `id`.
    pub fn edges_from<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges_from
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|key| self.edges.get(key))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Subgraph for `algorithm` as of the last rebuild.
    pub fn sub_graph(&self, algorithm: u8) -> Option<&SubGraph> {
        self.sub_graphs.get(&algorithm)
    }

    /// Algorithms that had a subgraph at the last rebuild.
    pub fn sub_graph_algorithms(&self) -> impl Iterator<Item = u8> + '_ {
        self.sub_graphs.keys().copied()
    }

    /// Number of subgraph rebuilds performed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn unlink_edge(&mut self, edge: &GraphEdge) {
        if let Some(out) = self.edges_from.get_mut(&edge.from) {
            out.remove(&edge.key);
            if out.is_empty() {
                self.edges_from.remove(&edge.from);
            }
        }
        if let Some(inbound) = self.edges_to.get_mut(&edge.to) {
            inbound.remove(&edge.key);
            if inbound.is_empty() {
                self.edges_to.remove(&edge.to);
            }
        }
    }
}

impl Graph for GraphStore {
    fn node_exists(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::NodeExists(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn delete_node(&mut self, id: &str) -> Result<GraphNode, GraphError> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_owned()))?;
        let incident: BTreeSet<String> = self
            .edges_from
            .get(id)
            .into_iter()
            .chain(self.edges_to.get(id))
            .flatten()
            .cloned()
            .collect();
        for key in incident {
            if let Some(edge) = self.edges.remove(&key) {
                self.unlink_edge(&edge);
            }
        }
        Ok(node)
    }

    fn edge_exists(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    fn edge_keys(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    fn edge(&self, key: &str) -> Option<&GraphEdge> {
        self.edges.get(key)
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.key) {
            return Err(GraphError::EdgeExists(edge.key));
        }
        for endpoint in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    edge: edge.key.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        self.edges_from
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.key.clone());
        self.edges_to
            .entry(edge.to.clone())
            .or_default()
            .insert(edge.key.clone());
        self.edges.insert(edge.key.clone(), edge);
        Ok(())
    }

    fn delete_edge(&mut self, key: &str) -> Result<GraphEdge, GraphError> {
        let edge = self
            .edges
            .remove(key)
            .ok_or_else(|| GraphError::EdgeNotFound(key.to_owned()))?;
        self.unlink_edge(&edge);
        Ok(edge)
    }

    fn weight(&self, key: &str, kind: WeightKind) -> Result<f64, GraphError> {
        self.all_weights(key)?
            .get(&kind)
            .copied()
            .ok_or_else(|| GraphError::WeightNotSet {
                key: key.to_owned(),
                kind,
            })
    }

    fn set_weight(&mut self, key: &str, kind: WeightKind, value: f64) -> Result<(), GraphError> {
        let edge = self
            .edges
            .get_mut(key)
            .ok_or_else(|| GraphError::EdgeNotFound(key.to_owned()))?;
        edge.weights.insert(kind, value);
        Ok(())
    }

    fn all_weights(&self, key: &str) -> Result<&BTreeMap<WeightKind, f64>, GraphError> {
        self.edges
            .get(key)
            .map(|edge| &edge.weights)
            .ok_or_else(|| GraphError::EdgeNotFound(key.to_owned()))
    }

    fn update_sub_graphs(&mut self) {
        let mut algorithms: BTreeSet<u8> = self
            .nodes
            .values()
            .flat_map(|node| node.algorithms.iter().copied())
            .collect();
        algorithms.insert(FLEX_ALGO_SPF);

        let mut sub_graphs = BTreeMap::new();
        for algorithm in algorithms {
            let nodes: BTreeSet<String> = self
                .nodes
                .values()
                .filter(|node| algorithm == FLEX_ALGO_SPF || node.algorithms.contains(&algorithm))
                .map(|node| node.id.clone())
                .collect();
            let edges = self
                .edges
                .values()
                .filter(|edge| nodes.contains(&edge.from) && nodes.contains(&edge.to))
                .map(|edge| edge.key.clone())
                .collect();
            sub_graphs.insert(
                algorithm,
                SubGraph {
                    algorithm,
                    nodes,
                    edges,
                },
            );
        }
        self.sub_graphs = sub_graphs;
        self.generation += 1;
    }
}
