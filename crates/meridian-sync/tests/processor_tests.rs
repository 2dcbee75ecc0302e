// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! NetworkProcessor scheduling under paused time: burst batching, timer
//! reset, quit, channel close and burst-end renormalization.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use meridian_cache::{Cache, SharedCache};
use meridian_dry_tests::{LinkBuilder, NodeBuilder, PrefixBuilder, RecordingGraph};
use meridian_graph::{self as graph, Graph, SharedGraph};
use meridian_model::{NetworkEvent, TopologySnapshot, WeightKind};
use meridian_normalize::{Metric, MinMaxNormalizer, NormalizeError, ZScoreNormalizer};
use meridian_sync::{EventDispatcher, NetworkProcessor, NodeReconciler};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

const HOLD: Duration = Duration::from_millis(100);

struct Harness {
    cache: SharedCache,
    graph: SharedGraph<RecordingGraph>,
    events: UnboundedSender<NetworkEvent>,
    signals: UnboundedReceiver<()>,
    quit: CancellationToken,
    task: JoinHandle<()>,
}

fn spawn_with(dispatcher: Option<EventDispatcher>) -> Harness {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (mut processor, signals) = NetworkProcessor::new(cache.clone(), graph.clone(), HOLD);
    if let Some(dispatcher) = dispatcher {
        processor = processor.with_dispatcher(dispatcher);
    }
    let (events, rx) = mpsc::unbounded_channel();
    let quit = CancellationToken::new();
    let task = tokio::spawn(processor.run(rx, quit.clone()));
    Harness {
        cache,
        graph,
        events,
        signals,
        quit,
        task,
    }
}

fn spawn() -> Harness {
    spawn_with(None)
}

fn add_node(router: &str) -> NetworkEvent {
    NetworkEvent::AddNode(NodeBuilder::new(router).algorithms([128]).build())
}

fn add_link(key: &str, from: &str, to: &str) -> NetworkEvent {
    NetworkEvent::AddLink(LinkBuilder::new(key, from, to).build())
}

// =============================================================================
// Batching
// =============================================================================

#[tokio::test(start_paused = true)]
async fn burst_holds_locks_and_recomputes_once() {
    let mut h = spawn();
    for event in [
        add_node("r1"),
        add_node("r2"),
        add_link("l12", "r1", "r2"),
        add_link("l21", "r2", "r1"),
    ] {
        h.events.send(event).unwrap();
    }

    sleep(HOLD / 2).await;
    assert!(h.graph.try_lock().is_err(), "graph locked mid-burst");
    assert!(h.cache.try_lock().is_err(), "cache locked mid-burst");

    h.signals.recv().await.expect("one update signal");
    let graph = h.graph.lock().await;
    assert_eq!(graph.recomputes(), 1);
    assert_eq!(graph.store().edge_count(), 2);
    assert_eq!(graph.store().sub_graph(128).unwrap().edges.len(), 2);
    drop(graph);
    assert!(h.signals.try_recv().is_err(), "no second signal");
    assert_eq!(h.cache.lock().await.node_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn each_event_restarts_the_hold_timer() {
    let mut h = spawn();
    let start = Instant::now();

    h.events.send(add_node("r1")).unwrap();
    sleep(HOLD * 3 / 4).await;
    h.events.send(add_node("r2")).unwrap();
    sleep(HOLD * 3 / 4).await;
    assert!(h.graph.try_lock().is_err(), "burst still open");

    h.signals.recv().await.unwrap();
    assert!(start.elapsed() >= HOLD * 7 / 4);
    assert_eq!(h.graph.lock().await.recomputes(), 1);
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_signal_separately() {
    let mut h = spawn();

    h.events.send(add_node("r1")).unwrap();
    h.signals.recv().await.unwrap();
    h.events.send(add_node("r2")).unwrap();
    h.signals.recv().await.unwrap();

    assert_eq!(h.graph.lock().await.recomputes(), 2);
}

#[tokio::test(start_paused = true)]
async fn prefix_only_burst_releases_without_signal() {
    let mut h = spawn();
    let prefix = PrefixBuilder::new("p1", "r1", "2001:db8:a::", 48).build();
    h.events.send(NetworkEvent::AddPrefix(prefix)).unwrap();

    sleep(HOLD * 2).await;
    assert!(h.signals.try_recv().is_err());
    assert_eq!(h.graph.lock().await.recomputes(), 0);
    assert!(h.cache.lock().await.client_network("2001:db8:a::/48").is_some());
}

#[tokio::test(start_paused = true)]
async fn rejected_link_does_not_owe_a_recompute() {
    let mut h = spawn();
    let incomplete = LinkBuilder::new("l1", "r1", "r2").delay(0).build();
    h.events.send(NetworkEvent::AddLink(incomplete)).unwrap();

    sleep(HOLD * 2).await;
    assert!(h.signals.try_recv().is_err());
    let graph = h.graph.lock().await;
    assert_eq!(graph.recomputes(), 0);
    assert!(!graph.edge_exists("l1"));
}

#[tokio::test(start_paused = true)]
async fn unregistered_entities_are_dropped() {
    let mut h = spawn_with(Some(
        EventDispatcher::builder().node(NodeReconciler).build(),
    ));
    h.events.send(add_link("l1", "r1", "r2")).unwrap();
    h.events.send(add_node("r1")).unwrap();

    h.signals.recv().await.unwrap();
    let graph = h.graph.lock().await;
    assert_eq!(graph.store().edge_count(), 0);
    assert!(graph.node_exists("r1"));
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test(start_paused = true)]
async fn quit_mid_burst_releases_locks_without_recompute() {
    let mut h = spawn();
    h.events.send(add_node("r1")).unwrap();
    sleep(HOLD / 2).await;

    h.quit.cancel();
    h.task.await.unwrap();

    assert_eq!(h.graph.try_lock().unwrap().recomputes(), 0);
    assert!(h.cache.try_lock().is_ok());
    assert!(h.signals.recv().await.is_none(), "sender dropped, nothing sent");
}

#[tokio::test(start_paused = true)]
async fn closed_channel_flushes_open_burst() {
    let mut h = spawn();
    h.events.send(add_link("l1", "r1", "r2")).unwrap();
    drop(h.events);

    h.task.await.unwrap();
    assert_eq!(h.signals.recv().await, Some(()));
    assert_eq!(h.signals.recv().await, None);
    assert_eq!(h.graph.lock().await.recomputes(), 1);
}

#[tokio::test(start_paused = true)]
async fn quit_while_idle_returns_promptly() {
    let h = spawn();
    h.quit.cancel();
    h.task.await.unwrap();
    assert!(h.graph.try_lock().is_ok());
}

// =============================================================================
// Snapshot load
// =============================================================================

fn two_router_snapshot() -> TopologySnapshot {
    TopologySnapshot {
        nodes: vec![
            NodeBuilder::new("r1").algorithms([128]).build(),
            NodeBuilder::new("r2").algorithms([128]).build(),
        ],
        links: vec![
            LinkBuilder::new("l12", "r1", "r2").delay(500).jitter(20).packet_loss(0.5).build(),
            LinkBuilder::new("l21", "r2", "r1").delay(1500).jitter(60).packet_loss(1.5).build(),
        ],
        ..TopologySnapshot::default()
    }
}

#[tokio::test]
async fn snapshot_load_normalizes_and_signals_once() {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (mut processor, mut signals) = NetworkProcessor::new(cache, graph.clone(), HOLD);

    let summary = processor
        .load_snapshot(two_router_snapshot(), &mut MinMaxNormalizer::new())
        .await
        .unwrap();
    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.links, 2);
    assert_eq!(signals.try_recv(), Ok(()));
    assert!(signals.try_recv().is_err());

    let graph = graph.lock().await;
    assert_eq!(graph.recomputes(), 1);
    let low = graph.weight("l12", WeightKind::NormalizedDelay).unwrap();
    let high = graph.weight("l21", WeightKind::NormalizedDelay).unwrap();
    assert!(low.abs() < 1e-12);
    assert!((high - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn normalizer_failure_leaves_topology_untouched() {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (mut processor, mut signals) = NetworkProcessor::new(cache.clone(), graph.clone(), HOLD);

    let mut snapshot = two_router_snapshot();
    snapshot.links = vec![
        LinkBuilder::new("l12", "r1", "r2").build(),
        LinkBuilder::new("l21", "r2", "r1").build(),
    ];
    let err: NormalizeError = processor
        .load_snapshot(snapshot, &mut ZScoreNormalizer::new())
        .await
        .unwrap_err();
    assert!(!err.to_string().is_empty());

    assert!(signals.try_recv().is_err());
    assert_eq!(graph.lock().await.recomputes(), 0);
    assert_eq!(cache.lock().await.node_count(), 0);
}

#[tokio::test]
async fn empty_snapshot_skips_normalization() {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (mut processor, _signals) = NetworkProcessor::new(cache, graph, HOLD);

    let snapshot = TopologySnapshot {
        nodes: vec![NodeBuilder::new("r1").build()],
        ..TopologySnapshot::default()
    };
    let summary = processor
        .load_snapshot(snapshot, &mut ZScoreNormalizer::new())
        .await
        .unwrap();
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.links, 0);
}

// =============================================================================
// Renormalization
// =============================================================================

fn weight(graph: &RecordingGraph, key: &str, kind: WeightKind) -> f64 {
    graph.weight(key, kind).unwrap()
}

#[tokio::test(start_paused = true)]
async fn link_update_after_snapshot_renormalizes_every_edge() {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (processor, mut signals) = NetworkProcessor::new(cache, graph.clone(), HOLD);
    let mut processor = processor
        .with_normalizer(Box::new(MinMaxNormalizer::new()))
        .with_threshold_window(4);
    processor
        .load_snapshot(two_router_snapshot(), &mut MinMaxNormalizer::new())
        .await
        .unwrap();
    signals.recv().await.unwrap();
    let tracker = processor.thresholds().unwrap();
    assert_eq!(tracker.windows(Metric::Delay).len(), 1);
    assert_eq!(tracker.smoothed(Metric::Delay).unwrap().max, 1500.0);

    let (events, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(processor.run(rx, CancellationToken::new()));
    // Telemetry carries raw values only; the normalized fields arrive as zero.
    let update = LinkBuilder::new("l21", "r2", "r1")
        .delay(1400)
        .jitter(60)
        .packet_loss(1.5)
        .build();
    events.send(NetworkEvent::UpdateLink(update)).unwrap();
    signals.recv().await.unwrap();

    {
        let graph = graph.lock().await;
        assert_eq!(graph.recomputes(), 2);
        assert_eq!(weight(&graph, "l21", WeightKind::Delay), 1400.0);
        assert!((weight(&graph, "l21", WeightKind::NormalizedDelay) - 1.0).abs() < 1e-12);
        assert!((weight(&graph, "l21", WeightKind::NormalizedJitter) - 1.0).abs() < 1e-12);
        assert!((weight(&graph, "l21", WeightKind::NormalizedPacketLoss) - 1.0).abs() < 1e-12);
        assert!(weight(&graph, "l12", WeightKind::NormalizedDelay).abs() < 1e-12);
    }

    drop(events);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_renormalization_still_recomputes() {
    let cache = Cache::shared();
    let graph = graph::shared(RecordingGraph::new());
    let (processor, mut signals) = NetworkProcessor::new(cache, graph.clone(), HOLD);
    let mut processor = processor.with_normalizer(Box::new(ZScoreNormalizer::new()));
    processor
        .load_snapshot(two_router_snapshot(), &mut ZScoreNormalizer::new())
        .await
        .unwrap();
    signals.recv().await.unwrap();
    assert!(processor.thresholds().is_none());

    let (events, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(processor.run(rx, CancellationToken::new()));
    // Both links now report identical metrics: no spread to standardise.
    let flat = LinkBuilder::new("l21", "r2", "r1")
        .delay(500)
        .jitter(20)
        .packet_loss(0.5)
        .build();
    events.send(NetworkEvent::UpdateLink(flat)).unwrap();
    signals.recv().await.unwrap();

    {
        let graph = graph.lock().await;
        assert_eq!(graph.recomputes(), 2);
        assert!((weight(&graph, "l12", WeightKind::NormalizedDelay) + 1.0).abs() < 1e-12);
    }

    drop(events);
    task.await.unwrap();
}
