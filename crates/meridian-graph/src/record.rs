// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph record types: nodes, edges and per-algorithm subgraphs.

use std::collections::{BTreeMap, BTreeSet};

use meridian_model::WeightKind;

/// Materialised router in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphNode {
    /// IGP router identifier (graph key).
    pub id: String,
    /// Hostname; empty for placeholders created ahead of the node event.
    pub name: String,
    /// Flex-Algo identifiers the router participates in.
    pub algorithms: BTreeSet<u8>,
}

impl GraphNode {
    /// Node with no name and no algorithms, used when a link names a router
    /// the graph has not heard about yet.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Directed, weighted edge.
///
/// Invariants
/// - `from` and `to` reference nodes present in the same graph.
/// - `key` is the link key and unique within the graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphEdge {
    /// Link key.
    pub key: String,
    /// Source router id.
    pub from: String,
    /// Destination router id.
    pub to: String,
    /// Current value per weight kind.
    pub weights: BTreeMap<WeightKind, f64>,
}

impl GraphEdge {
    /// Build an edge from its endpoints and an iterator of weights.
    pub fn new(
        key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        weights: impl IntoIterator<Item = (WeightKind, f64)>,
    ) -> Self {
        Self {
            key: key.into(),
            from: from.into(),
            to: to.into(),
            weights: weights.into_iter().collect(),
        }
    }
}

/// Nodes and edges eligible for one Flex-Algo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubGraph {
    /// Flex-Algo identifier.
    pub algorithm: u8,
    /// Router ids participating in the algorithm.
    pub nodes: BTreeSet<String>,
    /// Keys of edges whose both endpoints participate.
    pub edges: BTreeSet<String>,
}
