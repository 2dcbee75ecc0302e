// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! meridian-graph: the weighted topology graph consumed by path computation.
//!
//! [`Graph`] is the contract the synchronization core writes through. Nodes
//! are keyed by IGP router id, edges by link key, and every edge carries a
//! [`WeightKind`](meridian_model::WeightKind) to value map. [`GraphStore`] is
//! the in-memory implementation; it also maintains one [`SubGraph`] per
//! Flex-Algo, rebuilt on demand by [`Graph::update_sub_graphs`].
#![forbid(unsafe_code)]

mod graph;
mod record;
mod store;

use std::sync::Arc;

pub use graph::{Graph, GraphError};
pub use record::{GraphEdge, GraphNode, SubGraph};
pub use store::{GraphStore, FLEX_ALGO_SPF};

/// Lock handle shared between the network processor and graph readers.
pub type SharedGraph<G> = Arc<tokio::sync::Mutex<G>>;

/// Wrap a graph in a [`SharedGraph`].
pub fn shared<G: Graph>(graph: G) -> SharedGraph<G> {
    Arc::new(tokio::sync::Mutex::new(graph))
}
