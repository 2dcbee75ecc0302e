// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! meridian-normalize: dimensionless link metrics for multi-constraint search.
//!
//! Raw delay, jitter and packet loss arrive in different units and ranges.
//! A [`Normalizer`] takes a full link snapshot, computes batch statistics
//! from scratch, and writes `normalized_delay`, `normalized_jitter` and
//! `normalized_packet_loss` on every link. The link reconciler later copies
//! those fields into graph edge weights.
//!
//! Strategies are interchangeable and selected through
//! [`NormalizationStrategy`]. Every statistic failure is returned as a
//! [`NormalizeError`]; nothing is written when any metric fails.
//!
//! [`window`] carries the rolling aggregator used to smooth thresholds over
//! successive batches.
#![forbid(unsafe_code)]

mod error;
mod normalizer;
pub mod stats;
mod strategy;
pub mod window;

pub use error::{Metric, NormalizeError, StatError};
pub use normalizer::{
    IqrMinMaxNormalizer, MetricBatch, MetricNormalizer, MetricSeries, MinMaxNormalizer,
    Normalizer, RobustNormalizer, ZScoreNormalizer,
};
pub use strategy::{IqrMinMax, MinMax, NormalizationStrategy, Robust, Scaling, ZScore};
pub use window::{MetricThresholds, RollingWindow, ThresholdTracker, ThresholdWindows};
