// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rolling windows for smoothing normalization thresholds across batches.
//!
//! A single snapshot can be noisy: one congested link shifts the quartiles
//! of the whole batch. [`ThresholdWindows`] keeps the last N observed
//! Q1/Q3/min/max per metric so callers can work from windowed averages
//! instead of the most recent batch alone.

use std::collections::VecDeque;

use crate::error::{Metric, StatError};
use crate::normalizer::MetricBatch;
use crate::stats;

/// Fixed-capacity sequence with a running sum.
///
/// `push` and `average` are O(1); the oldest value is evicted once the
/// window is full.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// Creates a window holding at most `capacity` values (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
        }
    }

    /// Append `value`, returning the evicted value when the window was full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            self.sum -= old;
        }
        self.values.push_back(value);
        self.sum += value;
        evicted
    }

    /// Mean of the values currently held, `None` when empty.
    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no value has been pushed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the next push evicts.
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Maximum number of values held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// Quartile fences and observed range of one metric batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThresholds {
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl MetricThresholds {
    /// Compute thresholds over `values`.
    pub fn from_values(values: &[f64]) -> Result<Self, StatError> {
        let q = stats::quartiles(values)?;
        Ok(Self {
            q1: q.q1,
            q3: q.q3,
            min: stats::min(values)?,
            max: stats::max(values)?,
        })
    }
}

/// One rolling window each for Q1, Q3, min and max.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdWindows {
    q1: RollingWindow,
    q3: RollingWindow,
    min: RollingWindow,
    max: RollingWindow,
}

impl ThresholdWindows {
    /// Creates empty windows of `capacity` each.
    pub fn new(capacity: usize) -> Self {
        Self {
            q1: RollingWindow::new(capacity),
            q3: RollingWindow::new(capacity),
            min: RollingWindow::new(capacity),
            max: RollingWindow::new(capacity),
        }
    }

    /// Record one batch's thresholds.
    pub fn observe(&mut self, thresholds: &MetricThresholds) {
        self.q1.push(thresholds.q1);
        self.q3.push(thresholds.q3);
        self.min.push(thresholds.min);
        self.max.push(thresholds.max);
    }

    /// Windowed averages, `None` before the first observation.
    pub fn averages(&self) -> Option<MetricThresholds> {
        Some(MetricThresholds {
            q1: self.q1.average()?,
            q3: self.q3.average()?,
            min: self.min.average()?,
            max: self.max.average()?,
        })
    }

    /// Number of batches currently in the windows.
    pub fn len(&self) -> usize {
        self.q1.len()
    }

    /// True before the first observation.
    pub fn is_empty(&self) -> bool {
        self.q1.is_empty()
    }
}

/// Threshold windows for all three metrics, fed from normalizer batches.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTracker {
    delay: ThresholdWindows,
    jitter: ThresholdWindows,
    packet_loss: ThresholdWindows,
}

impl ThresholdTracker {
    /// Creates a tracker whose windows hold `capacity` batches.
    pub fn new(capacity: usize) -> Self {
        Self {
            delay: ThresholdWindows::new(capacity),
            jitter: ThresholdWindows::new(capacity),
            packet_loss: ThresholdWindows::new(capacity),
        }
    }

    /// Record the raw thresholds of a processed batch. Nothing is recorded
    /// if any metric's thresholds cannot be computed.
    pub fn observe_batch(&mut self, batch: &MetricBatch) -> Result<(), StatError> {
        let delay = MetricThresholds::from_values(&batch.raw.delay)?;
        let jitter = MetricThresholds::from_values(&batch.raw.jitter)?;
        let packet_loss = MetricThresholds::from_values(&batch.raw.packet_loss)?;
        self.delay.observe(&delay);
        self.jitter.observe(&jitter);
        self.packet_loss.observe(&packet_loss);
        Ok(())
    }

    /// Windows for one metric.
    pub fn windows(&self, metric: Metric) -> &ThresholdWindows {
        match metric {
            Metric::Delay => &self.delay,
            Metric::Jitter => &self.jitter,
            Metric::PacketLoss => &self.packet_loss,
        }
    }

    /// Smoothed thresholds for one metric.
    pub fn smoothed(&self, metric: Metric) -> Option<MetricThresholds> {
        self.windows(metric).averages()
    }
}
