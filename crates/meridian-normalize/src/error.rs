// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for statistics and normalization passes.

use std::fmt;

use thiserror::Error;

/// The three link metrics the normalizer rescales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Unidirectional link delay.
    Delay,
    /// Unidirectional delay variation.
    Jitter,
    /// Unidirectional packet loss.
    PacketLoss,
}

impl Metric {
    /// All metrics in processing order.
    pub const ALL: [Self; 3] = [Self::Delay, Self::Jitter, Self::PacketLoss];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delay => "delay",
            Self::Jitter => "jitter",
            Self::PacketLoss => "packet loss",
        })
    }
}

/// A statistic could not be computed over the given values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    /// Too few values for the statistic.
    #[error("need at least {needed} values, got {got}")]
    InsufficientData {
        /// Minimum number of values.
        needed: usize,
        /// Number of values supplied.
        got: usize,
    },
    /// Input contained NaN or an infinity.
    #[error("non-finite input value {0}")]
    NonFinite(f64),
    /// A spread statistic used as divisor is zero.
    #[error("{0} is zero")]
    Degenerate(&'static str),
}

/// A normalization pass failed for one metric.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot normalize {metric}: {source}")]
pub struct NormalizeError {
    /// Metric whose statistics failed.
    pub metric: Metric,
    /// Underlying statistic failure.
    #[source]
    pub source: StatError,
}
