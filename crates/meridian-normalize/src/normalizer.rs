// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The normalizer interface and its shared base.

use std::marker::PhantomData;

use meridian_model::Link;
use tracing::debug;

use crate::error::{Metric, NormalizeError};
use crate::strategy::{IqrMinMax, MinMax, NormalizationStrategy, Robust, Scaling, ZScore};

/// Delay, jitter and packet-loss values, one entry per link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSeries {
    /// Delay values.
    pub delay: Vec<f64>,
    /// Jitter values.
    pub jitter: Vec<f64>,
    /// Packet-loss values.
    pub packet_loss: Vec<f64>,
}

impl MetricSeries {
    /// Extract the raw metric arrays from a link snapshot.
    pub fn from_links(links: &[Link]) -> Self {
        Self {
            delay: links
                .iter()
                .map(|l| f64::from(l.unidir_link_delay))
                .collect(),
            jitter: links
                .iter()
                .map(|l| f64::from(l.unidir_delay_variation))
                .collect(),
            packet_loss: links.iter().map(|l| l.unidir_packet_loss).collect(),
        }
    }

    /// Values of one metric.
    pub fn get(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Delay => &self.delay,
            Metric::Jitter => &self.jitter,
            Metric::PacketLoss => &self.packet_loss,
        }
    }

    /// Number of links in the series.
    pub fn len(&self) -> usize {
        self.delay.len()
    }

    /// True when the series holds no links.
    pub fn is_empty(&self) -> bool {
        self.delay.is_empty()
    }
}

/// Raw and normalized arrays for the last processed snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricBatch {
    /// Values as reported by telemetry.
    pub raw: MetricSeries,
    /// Values written back onto the links.
    pub normalized: MetricSeries,
}

/// Computes dimensionless link metrics over a full snapshot.
pub trait Normalizer: Send + Sync {
    /// Strategy implemented by this normalizer.
    fn strategy(&self) -> NormalizationStrategy;

    /// Recompute statistics over `links` and write the three normalized
    /// fields on each of them. On error no link is modified.
    fn normalize(&mut self, links: &mut [Link]) -> Result<(), NormalizeError>;

    /// Scale already extracted raw values. The result is kept as the new
    /// [`batch`](Normalizer::batch); on error the previous batch stays.
    fn normalize_series(&mut self, raw: MetricSeries) -> Result<&MetricBatch, NormalizeError>;

    /// Arrays from the last successful call.
    fn batch(&self) -> &MetricBatch;
}

/// Normalizer parameterised by a [`Scaling`] strategy.
#[derive(Debug)]
pub struct MetricNormalizer<S> {
    batch: MetricBatch,
    _scaling: PhantomData<S>,
}

/// Clamped min-max normalizer.
pub type MinMaxNormalizer = MetricNormalizer<MinMax>;
/// Min-max normalizer bounded by the Tukey fences.
pub type IqrMinMaxNormalizer = MetricNormalizer<IqrMinMax>;
/// Standard-score normalizer.
pub type ZScoreNormalizer = MetricNormalizer<ZScore>;
/// Median/IQR normalizer.
pub type RobustNormalizer = MetricNormalizer<Robust>;

impl<S> Default for MetricNormalizer<S> {
    fn default() -> Self {
        Self {
            batch: MetricBatch::default(),
            _scaling: PhantomData,
        }
    }
}

impl<S: Scaling> MetricNormalizer<S> {
    /// Creates a normalizer with an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    fn scale(raw: &MetricSeries, metric: Metric) -> Result<Vec<f64>, NormalizeError> {
        S::scale(raw.get(metric)).map_err(|source| NormalizeError { metric, source })
    }
}

impl<S: Scaling> Normalizer for MetricNormalizer<S> {
    fn strategy(&self) -> NormalizationStrategy {
        S::STRATEGY
    }

    fn normalize(&mut self, links: &mut [Link]) -> Result<(), NormalizeError> {
        let normalized = &self.normalize_series(MetricSeries::from_links(links))?.normalized;
        for (i, link) in links.iter_mut().enumerate() {
            link.normalized_delay = normalized.delay[i];
            link.normalized_jitter = normalized.jitter[i];
            link.normalized_packet_loss = normalized.packet_loss[i];
        }
        Ok(())
    }

    fn normalize_series(&mut self, raw: MetricSeries) -> Result<&MetricBatch, NormalizeError> {
        let normalized = MetricSeries {
            delay: Self::scale(&raw, Metric::Delay)?,
            jitter: Self::scale(&raw, Metric::Jitter)?,
            packet_loss: Self::scale(&raw, Metric::PacketLoss)?,
        };
        debug!(strategy = %S::STRATEGY, links = raw.len(), "normalized link metrics");
        self.batch = MetricBatch { raw, normalized };
        Ok(&self.batch)
    }

    fn batch(&self) -> &MetricBatch {
        &self.batch
    }
}
