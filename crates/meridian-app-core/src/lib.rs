// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Meridian processes: the config port and
//! the sync settings document loaded through it.
#![forbid(unsafe_code)]

pub mod config;
pub mod sync_config;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use sync_config::{SyncConfig, SYNC_CONFIG_KEY};
