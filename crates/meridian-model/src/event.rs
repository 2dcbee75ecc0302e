// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Incremental topology change events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Link, Node, Prefix, Sid};

/// Entity family an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Router records.
    Node,
    /// Directed adjacencies.
    Link,
    /// Prefix announcements.
    Prefix,
    /// Segment identifiers.
    Sid,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Link => "link",
            Self::Prefix => "prefix",
            Self::Sid => "sid",
        })
    }
}

/// One change reported by the telemetry source.
///
/// Add and update variants carry the full payload. Delete variants carry only
/// the key, so reconcilers must look the entity up before removing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkEvent {
    /// A router appeared.
    AddNode(Node),
    /// A router's attributes changed.
    UpdateNode(Node),
    /// A router disappeared.
    DeleteNode {
        /// Key of the removed node.
        key: String,
    },
    /// A link appeared.
    AddLink(Link),
    /// A link's telemetry changed.
    UpdateLink(Link),
    /// A link disappeared.
    DeleteLink {
        /// Key of the removed link.
        key: String,
    },
    /// A prefix was announced.
    AddPrefix(Prefix),
    /// A prefix announcement was withdrawn.
    DeletePrefix {
        /// Key of the withdrawn announcement.
        key: String,
    },
    /// A SID appeared or changed.
    AddSid(Sid),
    /// A SID disappeared.
    DeleteSid {
        /// Key of the removed SID.
        key: String,
    },
}

impl NetworkEvent {
    /// Stable key of the entity this event refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::AddNode(node) | Self::UpdateNode(node) => &node.key,
            Self::AddLink(link) | Self::UpdateLink(link) => &link.key,
            Self::AddPrefix(prefix) => &prefix.key,
            Self::AddSid(sid) => &sid.key,
            Self::DeleteNode { key }
            | Self::DeleteLink { key }
            | Self::DeletePrefix { key }
            | Self::DeleteSid { key } => key,
        }
    }

    /// Entity family of the event.
    pub const fn entity(&self) -> EntityKind {
        match self {
            Self::AddNode(_) | Self::UpdateNode(_) | Self::DeleteNode { .. } => EntityKind::Node,
            Self::AddLink(_) | Self::UpdateLink(_) | Self::DeleteLink { .. } => EntityKind::Link,
            Self::AddPrefix(_) | Self::DeletePrefix { .. } => EntityKind::Prefix,
            Self::AddSid(_) | Self::DeleteSid { .. } => EntityKind::Sid,
        }
    }

    /// Short variant name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddNode(_) => "add_node",
            Self::UpdateNode(_) => "update_node",
            Self::DeleteNode { .. } => "delete_node",
            Self::AddLink(_) => "add_link",
            Self::UpdateLink(_) => "update_link",
            Self::DeleteLink { .. } => "delete_link",
            Self::AddPrefix(_) => "add_prefix",
            Self::DeletePrefix { .. } => "delete_prefix",
            Self::AddSid(_) => "add_sid",
            Self::DeleteSid { .. } => "delete_sid",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delete_variants_expose_their_key() {
        let event = NetworkEvent::DeletePrefix { key: "p1".into() };
        assert_eq!(event.key(), "p1");
        assert_eq!(event.entity(), EntityKind::Prefix);
    }

    #[test]
    fn payload_variants_expose_entity_key() {
        let event = NetworkEvent::UpdateNode(Node {
            key: "n1".into(),
            igp_router_id: "0000.0000.0001".into(),
            ..Node::default()
        });
        assert_eq!(event.key(), "n1");
        assert_eq!(event.entity(), EntityKind::Node);
        assert_eq!(event.name(), "update_node");
    }

    #[test]
    fn events_decode_from_tagged_json() {
        let add: NetworkEvent = serde_json::from_str(
            r#"{"type":"add_sid","key":"s1","igp_router_id":"r1","sid":"fc00:0:1::","algorithm":128}"#,
        )
        .unwrap();
        assert_eq!(add.entity(), EntityKind::Sid);
        assert_eq!(add.key(), "s1");

        let delete: NetworkEvent =
            serde_json::from_str(r#"{"type":"delete_link","key":"l9"}"#).unwrap();
        assert_eq!(delete, NetworkEvent::DeleteLink { key: "l9".into() });
    }
}
