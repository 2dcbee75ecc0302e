// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scaling strategies applied to one metric's values at a time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatError;
use crate::normalizer::{
    IqrMinMaxNormalizer, MinMaxNormalizer, Normalizer, RobustNormalizer, ZScoreNormalizer,
};
use crate::stats;

/// Tukey fence multiplier for the IQR-bounded min-max strategy.
const TUKEY_FENCE: f64 = 1.5;

/// Selects a normalizer implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStrategy {
    /// Clamped min-max scaling into `[0, 1]`.
    #[default]
    MinMax,
    /// Min-max scaling with bounds pulled in to the Tukey fences.
    IqrMinMax,
    /// `(x - mean) / stddev`, unclamped. `standard` is accepted as an alias.
    #[serde(alias = "standard")]
    ZScore,
    /// `(x - median) / IQR`, unclamped.
    Robust,
}

impl NormalizationStrategy {
    /// Build a fresh normalizer for this strategy.
    pub fn build(self) -> Box<dyn Normalizer> {
        match self {
            Self::MinMax => Box::new(MinMaxNormalizer::new()),
            Self::IqrMinMax => Box::new(IqrMinMaxNormalizer::new()),
            Self::ZScore => Box::new(ZScoreNormalizer::new()),
            Self::Robust => Box::new(RobustNormalizer::new()),
        }
    }

    /// Config-file spelling of the strategy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinMax => "min_max",
            Self::IqrMinMax => "iqr_min_max",
            Self::ZScore => "z_score",
            Self::Robust => "robust",
        }
    }
}

impl fmt::Display for NormalizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min_max" => Ok(Self::MinMax),
            "iqr_min_max" => Ok(Self::IqrMinMax),
            "z_score" | "standard" => Ok(Self::ZScore),
            "robust" => Ok(Self::Robust),
            other => Err(format!(
                "unknown normalization strategy `{other}` (expected min_max, iqr_min_max, z_score or robust)"
            )),
        }
    }
}

/// Rescales one metric across a batch.
pub trait Scaling: Send + Sync + 'static {
    /// Strategy tag reported by the normalizer.
    const STRATEGY: NormalizationStrategy;

    /// Rescale every value using statistics of the whole slice.
    fn scale(values: &[f64]) -> Result<Vec<f64>, StatError>;
}

/// Clamped min-max scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMax;

/// Min-max scaling bounded by the Tukey fences.
#[derive(Debug, Clone, Copy, Default)]
pub struct IqrMinMax;

/// Standard score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScore;

/// Median/IQR scaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robust;

fn min_max_between(values: &[f64], lower: f64, upper: f64) -> Vec<f64> {
    let range = upper - lower;
    if range <= 0.0 {
        // A flat batch has no spread to scale; every link sits at the bottom.
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - lower) / range).clamp(0.0, 1.0))
        .collect()
}

impl Scaling for MinMax {
    const STRATEGY: NormalizationStrategy = NormalizationStrategy::MinMax;

    fn scale(values: &[f64]) -> Result<Vec<f64>, StatError> {
        let lower = stats::min(values)?;
        let upper = stats::max(values)?;
        Ok(min_max_between(values, lower, upper))
    }
}

impl Scaling for IqrMinMax {
    const STRATEGY: NormalizationStrategy = NormalizationStrategy::IqrMinMax;

    fn scale(values: &[f64]) -> Result<Vec<f64>, StatError> {
        let q = stats::quartiles(values)?;
        let iqr = q.iqr();
        let lower = (q.q1 - TUKEY_FENCE * iqr).max(stats::min(values)?);
        let upper = (q.q3 + TUKEY_FENCE * iqr).min(stats::max(values)?);
        Ok(min_max_between(values, lower, upper))
    }
}

impl Scaling for ZScore {
    const STRATEGY: NormalizationStrategy = NormalizationStrategy::ZScore;

    fn scale(values: &[f64]) -> Result<Vec<f64>, StatError> {
        let mean = stats::mean(values)?;
        let sd = stats::std_dev(values)?;
        if sd == 0.0 {
            return Err(StatError::Degenerate("standard deviation"));
        }
        Ok(values.iter().map(|v| (v - mean) / sd).collect())
    }
}

impl Scaling for Robust {
    const STRATEGY: NormalizationStrategy = NormalizationStrategy::Robust;

    fn scale(values: &[f64]) -> Result<Vec<f64>, StatError> {
        let q = stats::quartiles(values)?;
        let iqr = q.iqr();
        if iqr == 0.0 {
            return Err(StatError::Degenerate("interquartile range"));
        }
        Ok(values.iter().map(|v| (v - q.q2) / iqr).collect())
    }
}
