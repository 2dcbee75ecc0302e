// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! meridian-sync: keeps the topology cache and graph in step with telemetry.
//!
//! Events flow `telemetry → NetworkProcessor → EventDispatcher → reconciler →
//! Cache / Graph`. The [`NetworkProcessor`] holds both locks for the length of
//! a burst and performs a single subgraph recomputation when the burst goes
//! quiet for the configured hold time.
#![forbid(unsafe_code)]

mod dispatch;
mod error;
mod processor;
pub mod reconcile;

pub use dispatch::{EventDispatcher, EventDispatcherBuilder, SnapshotSummary};
pub use error::ReconcileError;
pub use processor::{NetworkProcessor, DEFAULT_HOLD_TIME};
pub use reconcile::{LinkReconciler, NodeReconciler, PrefixReconciler, SidReconciler, WeightUpdate};
