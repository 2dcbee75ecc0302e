// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity records reported by topology telemetry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::weight::WeightKind;

/// Prefix length of a host route (IPv6 loopback). Host routes are never
/// client networks.
pub const HOST_ROUTE_LENGTH: u8 = 128;

/// A router in the segment-routed domain.
///
/// `key` identifies the telemetry record; `igp_router_id` is the stable
/// routing identity used to key graph nodes and the cache's router index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    /// Telemetry key, unique across nodes.
    pub key: String,
    /// IGP router identifier.
    pub igp_router_id: String,
    /// Hostname advertised by the router.
    #[serde(default)]
    pub name: String,
    /// Flexible-Algorithm identifiers the router participates in.
    #[serde(default)]
    pub sr_algorithms: BTreeSet<u8>,
}

/// One direction of a bidirectional adjacency.
///
/// Links are never cached; they exist as graph edges and as the transient
/// snapshot handed to the normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Telemetry key, used as the graph edge key.
    pub key: String,
    /// Router the link originates from.
    pub igp_router_id: String,
    /// Router the link points to.
    pub remote_igp_router_id: String,
    /// IGP metric.
    pub igp_metric: u32,
    /// Unidirectional link delay (microseconds).
    pub unidir_link_delay: u32,
    /// Unidirectional delay variation (microseconds).
    pub unidir_delay_variation: u32,
    /// Maximum link bandwidth (bits per second).
    pub max_link_bandwidth: u64,
    /// Unidirectional available bandwidth (bits per second).
    pub unidir_available_bandwidth: u64,
    /// Unidirectional utilized bandwidth (bits per second).
    pub unidir_bandwidth_utilization: u64,
    /// Unidirectional packet loss (percent).
    pub unidir_packet_loss: f64,
    /// Normalized delay, written by the normalizer.
    #[serde(default)]
    pub normalized_delay: f64,
    /// Normalized jitter, written by the normalizer.
    #[serde(default)]
    pub normalized_jitter: f64,
    /// Normalized packet loss, written by the normalizer.
    #[serde(default)]
    pub normalized_packet_loss: f64,
}

impl Link {
    /// Value this link carries for `kind`.
    pub fn weight(&self, kind: WeightKind) -> f64 {
        match kind {
            WeightKind::IgpMetric => f64::from(self.igp_metric),
            WeightKind::Delay => f64::from(self.unidir_link_delay),
            WeightKind::Jitter => f64::from(self.unidir_delay_variation),
            WeightKind::MaxBandwidth => self.max_link_bandwidth as f64,
            WeightKind::AvailableBandwidth => self.unidir_available_bandwidth as f64,
            WeightKind::UtilizedBandwidth => self.unidir_bandwidth_utilization as f64,
            WeightKind::PacketLoss => self.unidir_packet_loss,
            WeightKind::NormalizedDelay => self.normalized_delay,
            WeightKind::NormalizedJitter => self.normalized_jitter,
            WeightKind::NormalizedPacketLoss => self.normalized_packet_loss,
        }
    }

    /// All ten weights in [`WeightKind::ALL`] order.
    pub fn weights(&self) -> [(WeightKind, f64); 10] {
        WeightKind::ALL.map(|kind| (kind, self.weight(kind)))
    }
}

/// A prefix announced by one router.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prefix {
    /// Telemetry key (unique per announcement, i.e. per router).
    pub key: String,
    /// Announcing router.
    pub igp_router_id: String,
    /// Network address without length, e.g. `2001:db8:b::`.
    pub network_address: String,
    /// Prefix length, 0..=128.
    pub prefix_length: u8,
}

impl Prefix {
    /// Canonical `address/length` form; the unit of announcement counting.
    pub fn network(&self) -> String {
        format!("{}/{}", self.network_address, self.prefix_length)
    }

    /// True for /128 host routes.
    pub const fn is_host_route(&self) -> bool {
        self.prefix_length >= HOST_ROUTE_LENGTH
    }
}

/// A segment identifier bound to a router and a Flex-Algo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sid {
    /// Telemetry key.
    pub key: String,
    /// Owning router.
    pub igp_router_id: String,
    /// SID address.
    pub sid: String,
    /// Flexible-Algorithm identifier the SID belongs to.
    #[serde(default)]
    pub algorithm: u8,
}

/// Full topology dump used for initial builds and full rebuilds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    /// All known routers.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// All known links.
    #[serde(default)]
    pub links: Vec<Link>,
    /// All known prefix announcements.
    #[serde(default)]
    pub prefixes: Vec<Prefix>,
    /// All known segment identifiers.
    #[serde(default)]
    pub sids: Vec<Sid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_follow_canonical_order() {
        let link = Link {
            igp_metric: 10,
            unidir_link_delay: 2000,
            unidir_delay_variation: 30,
            max_link_bandwidth: 10_000,
            unidir_available_bandwidth: 8_000,
            unidir_bandwidth_utilization: 2_000,
            unidir_packet_loss: 0.5,
            normalized_delay: 0.25,
            ..Link::default()
        };
        let weights = link.weights();
        assert_eq!(weights[0], (WeightKind::IgpMetric, 10.0));
        assert_eq!(weights[6], (WeightKind::PacketLoss, 0.5));
        assert_eq!(weights[7], (WeightKind::NormalizedDelay, 0.25));
        assert_eq!(weights[9], (WeightKind::NormalizedPacketLoss, 0.0));
    }

    #[test]
    fn network_renders_address_and_length() {
        let prefix = Prefix {
            network_address: "2001:db8:b::".into(),
            prefix_length: 64,
            ..Prefix::default()
        };
        assert_eq!(prefix.network(), "2001:db8:b::/64");
        assert!(!prefix.is_host_route());
    }

    #[test]
    fn loopback_is_host_route() {
        let prefix = Prefix {
            network_address: "fc00:0:1::1".into(),
            prefix_length: 128,
            ..Prefix::default()
        };
        assert!(prefix.is_host_route());
    }

    #[test]
    fn normalized_fields_default_when_absent() {
        let link: Link = serde_json::from_str(
            r#"{"key":"l1","igp_router_id":"a","remote_igp_router_id":"b",
                "igp_metric":1,"unidir_link_delay":1,"unidir_delay_variation":1,
                "max_link_bandwidth":1,"unidir_available_bandwidth":1,
                "unidir_bandwidth_utilization":1,"unidir_packet_loss":1.0}"#,
        )
        .unwrap();
        assert_eq!(link.normalized_jitter, 0.0);
    }
}
