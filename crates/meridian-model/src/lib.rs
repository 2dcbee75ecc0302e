// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! meridian-model: topology entities and change events.
//!
//! Everything the synchronization core moves around lives here: the four
//! entity records reported by telemetry (nodes, links, prefixes and segment
//! identifiers), the [`NetworkEvent`] stream that carries their changes, and
//! the [`WeightKind`] vocabulary used for graph edge weights.
#![forbid(unsafe_code)]

mod entity;
mod event;
mod weight;

pub use entity::{Link, Node, Prefix, Sid, TopologySnapshot, HOST_ROUTE_LENGTH};
pub use event::{EntityKind, NetworkEvent};
pub use weight::WeightKind;
