// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Meridian crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`entities`] - Builders for topology records with populated telemetry
//! - [`graph`] - Graph wrapper that counts subgraph recomputations

pub mod config;
pub mod entities;
pub mod graph;

pub use config::InMemoryConfigStore;
pub use entities::{LinkBuilder, NodeBuilder, PrefixBuilder, SidBuilder};
pub use graph::RecordingGraph;
