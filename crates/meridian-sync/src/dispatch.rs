// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event routing to per-entity reconcilers.

use meridian_cache::Cache;
use meridian_graph::Graph;
use meridian_model::{EntityKind, NetworkEvent, TopologySnapshot};
use tracing::{debug, error, warn};

use crate::error::ReconcileError;
use crate::reconcile::{LinkReconciler, NodeReconciler, PrefixReconciler, SidReconciler};

/// Counts of entities applied from a full snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotSummary {
    /// Nodes stored.
    pub nodes: usize,
    /// Edges created.
    pub links: usize,
    /// Prefix announcements recorded.
    pub prefixes: usize,
    /// SIDs stored.
    pub sids: usize,
}

/// Routes events to whichever reconcilers are registered.
///
/// Dispatch never fails: reconciler errors are logged and reported as "no
/// graph change".
#[derive(Debug, Default)]
pub struct EventDispatcher {
    nodes: Option<NodeReconciler>,
    links: Option<LinkReconciler>,
    prefixes: Option<PrefixReconciler>,
    sids: Option<SidReconciler>,
}

/// Builder selecting which entity families an [`EventDispatcher`] handles.
#[derive(Debug, Default)]
pub struct EventDispatcherBuilder {
    inner: EventDispatcher,
}

impl EventDispatcherBuilder {
    /// Handle node events.
    pub fn node(mut self, reconciler: NodeReconciler) -> Self {
        self.inner.nodes = Some(reconciler);
        self
    }

    /// Handle link events.
    pub fn link(mut self, reconciler: LinkReconciler) -> Self {
        self.inner.links = Some(reconciler);
        self
    }

    /// Handle prefix events.
    pub fn prefix(mut self, reconciler: PrefixReconciler) -> Self {
        self.inner.prefixes = Some(reconciler);
        self
    }

    /// Handle SID events.
    pub fn sid(mut self, reconciler: SidReconciler) -> Self {
        self.inner.sids = Some(reconciler);
        self
    }

    /// Finish building.
    pub fn build(self) -> EventDispatcher {
        self.inner
    }
}

impl EventDispatcher {
    /// Dispatcher with all four reconcilers registered.
    pub fn new() -> Self {
        Self::builder()
            .node(NodeReconciler)
            .link(LinkReconciler)
            .prefix(PrefixReconciler::new())
            .sid(SidReconciler)
            .build()
    }

    /// Start from a dispatcher with nothing registered.
    pub fn builder() -> EventDispatcherBuilder {
        EventDispatcherBuilder::default()
    }

    /// True if events of `entity` have a reconciler.
    pub const fn handles(&self, entity: EntityKind) -> bool {
        match entity {
            EntityKind::Node => self.nodes.is_some(),
            EntityKind::Link => self.links.is_some(),
            EntityKind::Prefix => self.prefixes.is_some(),
            EntityKind::Sid => self.sids.is_some(),
        }
    }

    /// The prefix reconciler, for announcement-count inspection.
    pub const fn prefix_reconciler(&self) -> Option<&PrefixReconciler> {
        self.prefixes.as_ref()
    }

    /// Apply one event. Returns true if the graph changed and subgraphs need
    /// recomputing.
    pub fn dispatch<G: Graph>(&mut self, event: NetworkEvent, cache: &mut Cache, graph: &mut G) -> bool {
        let entity = event.entity();
        if !self.handles(entity) {
            warn!(%entity, key = event.key(), "no reconciler registered");
            return false;
        }
        let name = event.name();
        let key = event.key().to_owned();
        debug!(event = name, %key, "dispatching");

        match self.apply(event, cache, graph) {
            Ok(changed) => changed,
            Err(err) if err.is_validation() => {
                warn!(event = name, %key, %err, "event rejected");
                false
            }
            Err(err) => {
                error!(event = name, %key, %err, "event failed");
                false
            }
        }
    }

    fn apply<G: Graph>(
        &mut self,
        event: NetworkEvent,
        cache: &mut Cache,
        graph: &mut G,
    ) -> Result<bool, ReconcileError> {
        // `handles` has already confirmed the reconciler exists.
        match event {
            NetworkEvent::AddNode(node) | NetworkEvent::UpdateNode(node) => self
                .nodes
                .map_or(Ok(false), |r| r.upsert(node, cache, graph)),
            NetworkEvent::DeleteNode { key } => {
                self.nodes.map_or(Ok(false), |r| r.delete(&key, cache, graph))
            }
            NetworkEvent::AddLink(link) => {
                self.links.map_or(Ok(false), |r| r.add(&link, cache, graph))
            }
            NetworkEvent::UpdateLink(link) => self.links.map_or(Ok(false), |r| {
                let update = r.update(&link, cache, graph)?;
                if !update.skipped.is_empty() {
                    debug!(key = %link.key, skipped = ?update.skipped, "zero weights left unchanged");
                }
                Ok(update.graph_changed())
            }),
            NetworkEvent::DeleteLink { key } => {
                self.links.map_or(Ok(false), |r| r.delete(&key, graph))
            }
            NetworkEvent::AddPrefix(prefix) => {
                if let Some(r) = self.prefixes.as_mut() {
                    r.add(prefix, cache)?;
                }
                Ok(false)
            }
            NetworkEvent::DeletePrefix { key } => {
                if let Some(r) = self.prefixes.as_mut() {
                    r.delete(&key, cache)?;
                }
                Ok(false)
            }
            NetworkEvent::AddSid(sid) => {
                if let Some(r) = self.sids {
                    r.add(sid, cache);
                }
                Ok(false)
            }
            NetworkEvent::DeleteSid { key } => {
                if let Some(r) = self.sids {
                    r.delete(&key, cache);
                }
                Ok(false)
            }
        }
    }

    /// Bulk-apply a full snapshot: nodes, then links (which recomputes
    /// subgraphs once), then prefixes and SIDs.
    pub fn apply_snapshot<G: Graph>(
        &mut self,
        snapshot: TopologySnapshot,
        cache: &mut Cache,
        graph: &mut G,
    ) -> SnapshotSummary {
        let mut summary = SnapshotSummary::default();
        let TopologySnapshot {
            nodes,
            links,
            prefixes,
            sids,
        } = snapshot;

        if let Some(r) = self.nodes {
            for node in nodes {
                let key = node.key.clone();
                match r.upsert(node, cache, graph) {
                    Ok(_) => summary.nodes += 1,
                    Err(err) => error!(%key, %err, "node skipped during bulk load"),
                }
            }
        }
        match self.links {
            Some(r) => summary.links = r.process_links(&links, cache, graph),
            None => graph.update_sub_graphs(),
        }
        if let Some(r) = self.prefixes.as_mut() {
            summary.prefixes = r.process_prefixes(prefixes, cache);
        }
        if let Some(r) = self.sids {
            summary.sids = r.process_sids(sids, cache);
        }
        summary
    }
}
