// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Batch statistics over `f64` slices.
//!
//! Every function validates its input: empty slices and non-finite values
//! are errors rather than silently producing `NaN`.

use crate::error::StatError;

/// First, second and third quartile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    /// 25th percentile.
    pub q1: f64,
    /// Median.
    pub q2: f64,
    /// 75th percentile.
    pub q3: f64,
}

impl Quartiles {
    /// Interquartile range `q3 - q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

fn check(values: &[f64], needed: usize) -> Result<(), StatError> {
    if values.len() < needed {
        return Err(StatError::InsufficientData {
            needed,
            got: values.len(),
        });
    }
    match values.iter().find(|v| !v.is_finite()) {
        Some(&bad) => Err(StatError::NonFinite(bad)),
        None => Ok(()),
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Smallest value.
pub fn min(values: &[f64]) -> Result<f64, StatError> {
    check(values, 1)?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest value.
pub fn max(values: &[f64]) -> Result<f64, StatError> {
    check(values, 1)?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64, StatError> {
    check(values, 1)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Result<f64, StatError> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Median.
pub fn median(values: &[f64]) -> Result<f64, StatError> {
    check(values, 1)?;
    Ok(median_of_sorted(&sorted(values)))
}

/// Quartiles by Tukey's hinges: Q1 and Q3 are the medians of the lower and
/// upper halves, the middle element excluded when the length is odd.
///
/// A single value is its own Q1, median and Q3.
pub fn quartiles(values: &[f64]) -> Result<Quartiles, StatError> {
    check(values, 1)?;
    let sorted = sorted(values);
    let n = sorted.len();
    if n == 1 {
        let x = sorted[0];
        return Ok(Quartiles { q1: x, q2: x, q3: x });
    }
    let (lower, upper) = if n % 2 == 0 {
        (&sorted[..n / 2], &sorted[n / 2..])
    } else {
        (&sorted[..n / 2], &sorted[n / 2 + 1..])
    };
    Ok(Quartiles {
        q1: median_of_sorted(lower),
        q2: median_of_sorted(&sorted),
        q3: median_of_sorted(upper),
    })
}
