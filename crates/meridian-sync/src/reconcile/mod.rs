// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-entity reconcilers.
//!
//! Each reconciler turns one event into cache and/or graph mutations and
//! enforces its entity's consistency rules. Reconcilers are not internally
//! synchronised; callers hand them the cache and graph they already hold
//! locked.

mod link;
mod node;
mod prefix;
mod sid;

pub use link::{LinkReconciler, WeightUpdate};
pub use node::NodeReconciler;
pub use prefix::PrefixReconciler;
pub use sid::SidReconciler;
