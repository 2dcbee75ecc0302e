// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Settings document for the topology sync service.

use std::time::Duration;

use meridian_normalize::NormalizationStrategy;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Store key the sync settings live under.
pub const SYNC_CONFIG_KEY: &str = "sync";

/// Sync service settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period, in milliseconds, that ends an event burst.
    pub hold_time_ms: u64,
    /// Strategy applied to link metrics on snapshot load.
    pub normalization: NormalizationStrategy,
    /// Capacity of each rolling threshold window.
    pub threshold_window: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            hold_time_ms: 1000,
            normalization: NormalizationStrategy::default(),
            threshold_window: 16,
            log_filter: "info".to_owned(),
        }
    }
}

impl SyncConfig {
    /// Hold time as a [`Duration`].
    pub const fn hold_time(&self) -> Duration {
        Duration::from_millis(self.hold_time_ms)
    }

    /// Reject values the processor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_time_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "hold_time_ms",
                reason: "must be greater than zero",
            });
        }
        if self.threshold_window == 0 {
            return Err(ConfigError::Invalid {
                field: "threshold_window",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}
