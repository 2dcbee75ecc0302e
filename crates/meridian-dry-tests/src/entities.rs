// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builders for topology records.
//!
//! Links come out fully populated (every raw weight non-zero) so that tests
//! only spell out the telemetry they care about.

use meridian_model::{Link, Node, Prefix, Sid};

/// Builder for [`Node`]. The key is derived from the router id.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    /// Node for `igp_router_id`, keyed `node-<router>` and named after it.
    pub fn new(igp_router_id: &str) -> Self {
        Self {
            node: Node {
                key: format!("node-{igp_router_id}"),
                igp_router_id: igp_router_id.to_owned(),
                name: igp_router_id.to_owned(),
                ..Node::default()
            },
        }
    }

    /// Override the telemetry key.
    pub fn key(mut self, key: &str) -> Self {
        key.clone_into(&mut self.node.key);
        self
    }

    /// Set the hostname.
    pub fn name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.node.name);
        self
    }

    /// Set the Flex-Algo memberships.
    pub fn algorithms(mut self, algorithms: impl IntoIterator<Item = u8>) -> Self {
        self.node.sr_algorithms = algorithms.into_iter().collect();
        self
    }

    /// Finish.
    pub fn build(self) -> Node {
        self.node
    }
}

/// Builder for [`Link`] with realistic non-zero telemetry.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    link: Link,
}

impl LinkBuilder {
    /// Link `key` from `from` to `to`.
    pub fn new(key: &str, from: &str, to: &str) -> Self {
        Self {
            link: Link {
                key: key.to_owned(),
                igp_router_id: from.to_owned(),
                remote_igp_router_id: to.to_owned(),
                igp_metric: 10,
                unidir_link_delay: 1_000,
                unidir_delay_variation: 50,
                max_link_bandwidth: 10_000_000_000,
                unidir_available_bandwidth: 8_000_000_000,
                unidir_bandwidth_utilization: 2_000_000_000,
                unidir_packet_loss: 0.1,
                ..Link::default()
            },
        }
    }

    /// IGP metric.
    pub fn igp_metric(mut self, value: u32) -> Self {
        self.link.igp_metric = value;
        self
    }

    /// Unidirectional delay.
    pub fn delay(mut self, value: u32) -> Self {
        self.link.unidir_link_delay = value;
        self
    }

    /// Unidirectional delay variation.
    pub fn jitter(mut self, value: u32) -> Self {
        self.link.unidir_delay_variation = value;
        self
    }

    /// Maximum bandwidth.
    pub fn max_bandwidth(mut self, value: u64) -> Self {
        self.link.max_link_bandwidth = value;
        self
    }

    /// Available bandwidth.
    pub fn available_bandwidth(mut self, value: u64) -> Self {
        self.link.unidir_available_bandwidth = value;
        self
    }

    /// Utilized bandwidth.
    pub fn utilized_bandwidth(mut self, value: u64) -> Self {
        self.link.unidir_bandwidth_utilization = value;
        self
    }

    /// Packet loss.
    pub fn packet_loss(mut self, value: f64) -> Self {
        self.link.unidir_packet_loss = value;
        self
    }

    /// Normalized delay, jitter and packet loss.
    pub fn normalized(mut self, delay: f64, jitter: f64, packet_loss: f64) -> Self {
        self.link.normalized_delay = delay;
        self.link.normalized_jitter = jitter;
        self.link.normalized_packet_loss = packet_loss;
        self
    }

    /// Finish.
    pub fn build(self) -> Link {
        self.link
    }
}

/// Builder for [`Prefix`].
#[derive(Debug, Clone)]
pub struct PrefixBuilder {
    prefix: Prefix,
}

impl PrefixBuilder {
    /// Announcement `key` of `address/length` by `igp_router_id`.
    pub fn new(key: &str, igp_router_id: &str, address: &str, length: u8) -> Self {
        Self {
            prefix: Prefix {
                key: key.to_owned(),
                igp_router_id: igp_router_id.to_owned(),
                network_address: address.to_owned(),
                prefix_length: length,
            },
        }
    }

    /// Finish.
    pub fn build(self) -> Prefix {
        self.prefix
    }
}

/// Builder for [`Sid`]. Defaults to Flex-Algo 0.
#[derive(Debug, Clone)]
pub struct SidBuilder {
    sid: Sid,
}

impl SidBuilder {
    /// SID `key` with address `sid` owned by `igp_router_id`.
    pub fn new(key: &str, igp_router_id: &str, sid: &str) -> Self {
        Self {
            sid: Sid {
                key: key.to_owned(),
                igp_router_id: igp_router_id.to_owned(),
                sid: sid.to_owned(),
                algorithm: 0,
            },
        }
    }

    /// Flex-Algo the SID belongs to.
    pub fn algorithm(mut self, algorithm: u8) -> Self {
        self.sid.algorithm = algorithm;
        self
    }

    /// Finish.
    pub fn build(self) -> Sid {
        self.sid
    }
}
