// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The graph contract written by the synchronization core.

use std::collections::BTreeMap;

use meridian_model::WeightKind;
use thiserror::Error;

use crate::record::{GraphEdge, GraphNode};

/// Errors returned by [`Graph`] mutations and weight lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No node with this router id.
    #[error("node {0} not found")]
    NodeNotFound(String),
    /// No edge with this key.
    #[error("edge {0} not found")]
    EdgeNotFound(String),
    /// A node with this router id already exists.
    #[error("node {0} already exists")]
    NodeExists(String),
    /// An edge with this key already exists.
    #[error("edge {0} already exists")]
    EdgeExists(String),
    /// An edge endpoint is not present in the graph.
    #[error("edge {edge} references missing node {node}")]
    MissingEndpoint {
        /// Edge being inserted.
        edge: String,
        /// The absent endpoint.
        node: String,
    },
    /// The edge exists but carries no value for this kind.
    #[error("edge {key} has no {kind} weight")]
    WeightNotSet {
        /// Edge key.
        key: String,
        /// Missing weight kind.
        kind: WeightKind,
    },
}

/// Weighted directed graph keyed by router id (nodes) and link key (edges).
///
/// Implementations need no internal synchronization; callers serialize access
/// through [`SharedGraph`](crate::SharedGraph).
pub trait Graph: Send {
    /// True when a node with `id` exists.
    fn node_exists(&self, id: &str) -> bool;
    /// Shared reference to a node.
    fn node(&self, id: &str) -> Option<&GraphNode>;
    /// Mutable reference to a node, for in-place attribute updates.
    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode>;
    /// Insert a new node. Fails with [`GraphError::NodeExists`] on duplicates.
    fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError>;
    /// Remove a node together with every incident edge.
    fn delete_node(&mut self, id: &str) -> Result<GraphNode, GraphError>;

    /// True when an edge with `key` exists.
    fn edge_exists(&self, key: &str) -> bool;
    /// Shared reference to an edge.
    fn edge(&self, key: &str) -> Option<&GraphEdge>;
    /// Insert a new edge. Both endpoints must already exist.
    fn add_edge(&mut self, edge: GraphEdge) -> Result<(), GraphError>;
    /// Remove an edge.
    fn delete_edge(&mut self, key: &str) -> Result<GraphEdge, GraphError>;
    /// Keys of every edge, in a stable order.
    fn edge_keys(&self) -> Vec<String>;

    /// Current value of one weight on an edge.
    fn weight(&self, key: &str, kind: WeightKind) -> Result<f64, GraphError>;
    /// Overwrite one weight on an edge.
    fn set_weight(&mut self, key: &str, kind: WeightKind, value: f64) -> Result<(), GraphError>;
    /// Every weight on an edge.
    fn all_weights(&self, key: &str) -> Result<&BTreeMap<WeightKind, f64>, GraphError>;

    /// Rebuild the per-algorithm subgraphs from current nodes and edges.
    fn update_sub_graphs(&mut self);
}
