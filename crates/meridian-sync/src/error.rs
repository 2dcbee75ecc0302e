// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reconciler error taxonomy.

use meridian_graph::GraphError;
use meridian_model::WeightKind;
use thiserror::Error;

/// Why a reconciler declined or failed to apply an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Telemetry has not been fully populated yet; a later update is
    /// expected to carry real values.
    #[error("link {key}: {kind} is zero")]
    ZeroWeight {
        /// Link key.
        key: String,
        /// First zero-valued weight kind.
        kind: WeightKind,
    },
    /// A prefix delete named a key the cache never saw.
    #[error("prefix {0} is not cached")]
    UnknownPrefix(String),
    /// Announcement bookkeeping lost track of a cached prefix's network.
    #[error("no announcement count for {network} (prefix {key})")]
    UnsyncedPrefixCount {
        /// Prefix key being deleted.
        key: String,
        /// Network whose count is missing.
        network: String,
    },
    /// The graph rejected a mutation.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ReconcileError {
    /// True for validation rejections (incomplete telemetry), false for
    /// bookkeeping errors that indicate a bug or desynchronised state.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ZeroWeight { .. })
    }
}
