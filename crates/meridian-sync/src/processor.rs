// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Burst scheduling: lock once, dispatch many, recompute once.
//!
//! The first event of a burst takes the cache lock and then the graph lock
//! and keeps both until the burst goes quiet for the hold time. Each further
//! event restarts the hold timer. When the timer fires the subgraphs are
//! recomputed (only if some event touched the graph) before the locks are
//! released, and a single update signal follows. With a normalizer attached
//! the normalized link weights are refreshed from the raw ones first.

use std::time::Duration;

use meridian_cache::{Cache, SharedCache};
use meridian_graph::{Graph, SharedGraph};
use meridian_model::{NetworkEvent, TopologySnapshot, WeightKind};
use meridian_normalize::{
    Metric, MetricBatch, MetricSeries, NormalizeError, Normalizer, ThresholdTracker,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::OwnedMutexGuard;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::{EventDispatcher, SnapshotSummary};

/// Quiet period that ends a burst when none is configured.
pub const DEFAULT_HOLD_TIME: Duration = Duration::from_secs(1);

/// Locks and bookkeeping held for the length of one burst.
struct Burst<G> {
    cache: OwnedMutexGuard<Cache>,
    graph: OwnedMutexGuard<G>,
    events: usize,
    recompute_owed: bool,
}

enum State<G> {
    Idle,
    Accumulating(Burst<G>),
}

/// Consumes topology events and keeps the shared cache and graph current.
pub struct NetworkProcessor<G> {
    cache: SharedCache,
    graph: SharedGraph<G>,
    dispatcher: EventDispatcher,
    hold_time: Duration,
    updates: UnboundedSender<()>,
    normalizer: Option<Box<dyn Normalizer>>,
    thresholds: Option<ThresholdTracker>,
}

impl<G: Graph + 'static> NetworkProcessor<G> {
    /// Create a processor with every reconciler registered.
    ///
    /// The returned receiver gets one `()` per completed recomputation.
    pub fn new(
        cache: SharedCache,
        graph: SharedGraph<G>,
        hold_time: Duration,
    ) -> (Self, UnboundedReceiver<()>) {
        let (updates, signals) = mpsc::unbounded_channel();
        let processor = Self {
            cache,
            graph,
            dispatcher: EventDispatcher::new(),
            hold_time,
            updates,
            normalizer: None,
            thresholds: None,
        };
        (processor, signals)
    }

    /// Replace the dispatcher, e.g. to register only some entity families.
    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Renormalize every edge at the end of each burst that touched the graph.
    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Track rolling raw-metric thresholds over the last `capacity` batches.
    pub fn with_threshold_window(mut self, capacity: usize) -> Self {
        self.thresholds = Some(ThresholdTracker::new(capacity));
        self
    }

    /// Rolling thresholds, when a window is configured.
    pub const fn thresholds(&self) -> Option<&ThresholdTracker> {
        self.thresholds.as_ref()
    }

    /// Configured hold time.
    pub const fn hold_time(&self) -> Duration {
        self.hold_time
    }

    /// Current dispatcher.
    pub const fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Build the initial topology from a full snapshot.
    ///
    /// Links are normalized first; a normalizer failure aborts before the
    /// cache or graph is touched. Emits one update signal on success.
    #[instrument(skip_all, fields(nodes = snapshot.nodes.len(), links = snapshot.links.len()))]
    pub async fn load_snapshot(
        &mut self,
        mut snapshot: TopologySnapshot,
        normalizer: &mut dyn Normalizer,
    ) -> Result<SnapshotSummary, NormalizeError> {
        if snapshot.links.is_empty() {
            debug!("snapshot has no links; skipping normalization");
        } else {
            normalizer.normalize(&mut snapshot.links)?;
            if let Some(tracker) = self.thresholds.as_mut() {
                observe(tracker, normalizer.batch());
            }
        }

        let mut cache = self.cache.lock().await;
        let mut graph = self.graph.lock().await;
        let summary = self
            .dispatcher
            .apply_snapshot(snapshot, &mut cache, &mut *graph);
        drop(graph);
        drop(cache);

        info!(
            nodes = summary.nodes,
            links = summary.links,
            prefixes = summary.prefixes,
            sids = summary.sids,
            strategy = %normalizer.strategy(),
            "snapshot loaded"
        );
        self.signal();
        Ok(summary)
    }

    /// Run until `quit` is cancelled or the event channel closes.
    ///
    /// Cancellation is only observed between events, so a dispatch in
    /// progress always completes. Quitting mid-burst releases the locks
    /// without recomputing. A closed channel flushes the open burst first.
    #[instrument(skip_all, fields(hold_ms = self.hold_time.as_millis()))]
    pub async fn run(mut self, mut events: UnboundedReceiver<NetworkEvent>, quit: CancellationToken) {
        let timer = sleep(self.hold_time);
        tokio::pin!(timer);
        let mut state = State::<G>::Idle;
        info!("network processor started");

        loop {
            let accumulating = matches!(state, State::Accumulating(_));
            tokio::select! {
                biased;

                () = quit.cancelled() => {
                    if let State::Accumulating(burst) = state {
                        debug!(events = burst.events, "quit mid-burst; releasing locks");
                        drop(burst);
                    }
                    info!("network processor stopped");
                    return;
                }

                received = events.recv() => {
                    let Some(event) = received else {
                        if let State::Accumulating(burst) = state {
                            self.finish_burst(burst);
                        }
                        info!("event channel closed; network processor stopped");
                        return;
                    };
                    let mut burst = match state {
                        State::Idle => self.begin_burst().await,
                        State::Accumulating(burst) => burst,
                    };
                    burst.events += 1;
                    if self.dispatcher.dispatch(event, &mut *burst.cache, &mut *burst.graph) {
                        burst.recompute_owed = true;
                    }
                    timer.as_mut().reset(Instant::now() + self.hold_time);
                    state = State::Accumulating(burst);
                }

                () = &mut timer, if accumulating => {
                    if let State::Accumulating(burst) = std::mem::replace(&mut state, State::Idle) {
                        self.finish_burst(burst);
                    }
                }
            }
        }
    }

    async fn begin_burst(&self) -> Burst<G> {
        let cache = self.cache.clone().lock_owned().await;
        let graph = self.graph.clone().lock_owned().await;
        debug!("burst started; cache and graph locked");
        Burst {
            cache,
            graph,
            events: 0,
            recompute_owed: false,
        }
    }

    fn finish_burst(&mut self, burst: Burst<G>) {
        let Burst {
            cache,
            mut graph,
            events,
            recompute_owed,
        } = burst;
        if recompute_owed {
            self.renormalize(&mut *graph);
            graph.update_sub_graphs();
        }
        drop(graph);
        drop(cache);
        info!(events, recompute = recompute_owed, "burst complete");
        if recompute_owed {
            self.signal();
        }
    }

    fn renormalize(&mut self, graph: &mut G) {
        let Some(normalizer) = self.normalizer.as_mut() else {
            return;
        };
        match renormalize_edges(graph, normalizer.as_mut()) {
            Ok(0) => debug!("no edges to normalize"),
            Ok(edges) => {
                debug!(edges, strategy = %normalizer.strategy(), "normalized weights refreshed");
                if let Some(tracker) = self.thresholds.as_mut() {
                    observe(tracker, normalizer.batch());
                }
            }
            Err(err) => warn!(%err, "renormalization failed; keeping previous normalized weights"),
        }
    }

    fn signal(&self) {
        if self.updates.send(()).is_err() {
            debug!("no update listener");
        }
    }
}

/// Rescale the normalized weights of every edge from its raw delay, jitter
/// and packet-loss weights. Returns the number of edges rewritten.
fn renormalize_edges<G: Graph>(
    graph: &mut G,
    normalizer: &mut dyn Normalizer,
) -> Result<usize, NormalizeError> {
    let mut keys = Vec::new();
    let mut raw = MetricSeries::default();
    for key in graph.edge_keys() {
        let (Ok(delay), Ok(jitter), Ok(loss)) = (
            graph.weight(&key, WeightKind::Delay),
            graph.weight(&key, WeightKind::Jitter),
            graph.weight(&key, WeightKind::PacketLoss),
        ) else {
            debug!(key = %key, "edge lacks raw metrics; not normalized");
            continue;
        };
        raw.delay.push(delay);
        raw.jitter.push(jitter);
        raw.packet_loss.push(loss);
        keys.push(key);
    }
    if keys.is_empty() {
        return Ok(0);
    }

    let normalized = &normalizer.normalize_series(raw)?.normalized;
    let rows = normalized
        .delay
        .iter()
        .zip(&normalized.jitter)
        .zip(&normalized.packet_loss);
    for (key, ((&delay, &jitter), &loss)) in keys.iter().zip(rows) {
        for (kind, value) in [
            (WeightKind::NormalizedDelay, delay),
            (WeightKind::NormalizedJitter, jitter),
            (WeightKind::NormalizedPacketLoss, loss),
        ] {
            if let Err(err) = graph.set_weight(key, kind, value) {
                warn!(key = %key, %kind, %err, "normalized weight not written");
            }
        }
    }
    Ok(keys.len())
}

fn observe(tracker: &mut ThresholdTracker, batch: &MetricBatch) {
    if let Err(err) = tracker.observe_batch(batch) {
        warn!(%err, "threshold statistics unavailable");
        return;
    }
    for metric in Metric::ALL {
        if let Some(t) = tracker.smoothed(metric) {
            debug!(%metric, q1 = t.q1, q3 = t.q3, min = t.min, max = t.max, "raw thresholds");
        }
    }
}
