// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Meridian daemon (meridiand)
//!
//! Loads the sync settings, optionally builds the topology from a snapshot,
//! then replays newline-delimited JSON events through the network processor
//! until end of input or Ctrl-C.

mod replay;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use meridian_app_core::{ConfigService, SyncConfig, SYNC_CONFIG_KEY};
use meridian_cache::Cache;
use meridian_config_fs::FsConfigStore;
use meridian_graph::{self as graph, GraphStore, SharedGraph};
use meridian_model::TopologySnapshot;
use meridian_normalize::{Metric, NormalizationStrategy};
use meridian_sync::NetworkProcessor;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Newline-delimited JSON events to replay (`-` reads stdin)
    #[clap(short, long, default_value = "-")]
    events: String,

    /// JSON topology snapshot loaded before replay
    #[clap(short, long)]
    snapshot: Option<PathBuf>,

    /// Override the burst hold time in milliseconds
    #[clap(long)]
    hold_time_ms: Option<u64>,

    /// Override the normalization strategy (min_max, iqr_min_max, z_score, robust)
    #[clap(long)]
    normalization: Option<NormalizationStrategy>,

    /// Directory holding `sync.json` (defaults to the platform config dir)
    #[clap(long)]
    config_dir: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<SyncConfig> {
    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir)?,
        None => FsConfigStore::new()?,
    };
    let service = ConfigService::new(store);
    let mut config: SyncConfig = service
        .load_or_init(SYNC_CONFIG_KEY)
        .context("loading sync config")?;
    if let Some(hold_time_ms) = args.hold_time_ms {
        config.hold_time_ms = hold_time_ms;
    }
    if let Some(strategy) = args.normalization {
        config.normalization = strategy;
    }
    config.validate()?;
    Ok(config)
}

async fn read_snapshot(path: &PathBuf) -> Result<TopologySnapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing snapshot {}", path.display()))
}

async fn log_updates(mut signals: mpsc::UnboundedReceiver<()>, graph: SharedGraph<GraphStore>) {
    while signals.recv().await.is_some() {
        let graph = graph.lock().await;
        info!(
            generation = graph.generation(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            algorithms = ?graph.sub_graph_algorithms().collect::<Vec<_>>(),
            "subgraphs updated"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("building log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        hold_ms = config.hold_time_ms,
        strategy = %config.normalization,
        window = config.threshold_window,
        "starting meridiand"
    );

    let cache = Cache::shared();
    let graph = graph::shared(GraphStore::new());
    let (processor, signals) =
        NetworkProcessor::new(Arc::clone(&cache), Arc::clone(&graph), config.hold_time());
    let mut processor = processor
        .with_normalizer(config.normalization.build())
        .with_threshold_window(config.threshold_window);

    if let Some(path) = &args.snapshot {
        let snapshot = read_snapshot(path).await?;
        let mut normalizer = config.normalization.build();
        let summary = processor
            .load_snapshot(snapshot, normalizer.as_mut())
            .await
            .context("loading snapshot")?;
        info!(?summary, "initial topology built");

        if let Some(thresholds) = processor.thresholds() {
            for metric in Metric::ALL {
                if let Some(t) = thresholds.smoothed(metric) {
                    info!(%metric, q1 = t.q1, q3 = t.q3, min = t.min, max = t.max, "raw thresholds");
                }
            }
        }
    }

    let updates = tokio::spawn(log_updates(signals, Arc::clone(&graph)));
    let quit = CancellationToken::new();
    let (events, rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(processor.run(rx, quit.clone()));

    let source = replay::open(&args.events).await?;
    tokio::select! {
        stats = replay::forward(source, &events) => {
            let stats = stats?;
            info!(forwarded = stats.forwarded, skipped = stats.skipped, "end of input");
        }
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("listening for Ctrl-C")?;
            info!("interrupt received; shutting down");
            quit.cancel();
        }
    }
    drop(events);

    worker.await.context("network processor task")?;
    updates.await.context("update logger task")?;
    info!("meridiand stopped");
    Ok(())
}
