// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Edge weight vocabulary shared by the link reconciler and the graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the ten numeric weights carried by every graph edge.
///
/// The seven raw kinds mirror link telemetry one to one. The three
/// normalized kinds are dimensionless values written by the normalizer and
/// may legitimately be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKind {
    /// IGP metric configured on the adjacency.
    IgpMetric,
    /// Unidirectional link delay.
    Delay,
    /// Unidirectional delay variation.
    Jitter,
    /// Maximum link bandwidth.
    MaxBandwidth,
    /// Unidirectional available bandwidth.
    AvailableBandwidth,
    /// Unidirectional utilized bandwidth.
    UtilizedBandwidth,
    /// Unidirectional packet loss.
    PacketLoss,
    /// Normalized delay in the normalizer's output range.
    NormalizedDelay,
    /// Normalized jitter in the normalizer's output range.
    NormalizedJitter,
    /// Normalized packet loss in the normalizer's output range.
    NormalizedPacketLoss,
}

impl WeightKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; 10] = [
        Self::IgpMetric,
        Self::Delay,
        Self::Jitter,
        Self::MaxBandwidth,
        Self::AvailableBandwidth,
        Self::UtilizedBandwidth,
        Self::PacketLoss,
        Self::NormalizedDelay,
        Self::NormalizedJitter,
        Self::NormalizedPacketLoss,
    ];

    /// True for the three normalizer-derived kinds.
    pub const fn is_normalized(self) -> bool {
        matches!(
            self,
            Self::NormalizedDelay | Self::NormalizedJitter | Self::NormalizedPacketLoss
        )
    }

    /// Stable snake_case name, matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IgpMetric => "igp_metric",
            Self::Delay => "delay",
            Self::Jitter => "jitter",
            Self::MaxBandwidth => "max_bandwidth",
            Self::AvailableBandwidth => "available_bandwidth",
            Self::UtilizedBandwidth => "utilized_bandwidth",
            Self::PacketLoss => "packet_loss",
            Self::NormalizedDelay => "normalized_delay",
            Self::NormalizedJitter => "normalized_jitter",
            Self::NormalizedPacketLoss => "normalized_packet_loss",
        }
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
