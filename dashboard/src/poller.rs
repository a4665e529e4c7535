use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use tokio::{join, select, sync::mpsc::Receiver, time};

use crate::{collector::Collector, state::Snapshot, AppState};

/// Drives the refresh cycle. The periodic timer and the manual trigger
/// land in the same loop, so every refresh is a full, independent
/// rebuild of all three record sets.
pub struct Poller {
    collector: Collector,
    state: Arc<AppState>,
    refresh_rx: Receiver<()>,
    period: Duration,
}

impl Poller {
    pub fn new(state: Arc<AppState>, refresh_rx: Receiver<()>) -> Self {
        Poller {
            collector: Collector::new(&state.config),
            period: Duration::from_secs(state.config.refresh_interval),
            state,
            refresh_rx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Refresh loop started with period {:?}", self.period);
        let mut ticker = time::interval(self.period);
        loop {
            select! {
                _ = ticker.tick() => {},
                Some(_) = self.refresh_rx.recv() => {
                    tracing::info!("Manual refresh triggered");
                },
            }
            self.tick().await;
        }
    }

    /// One refresh tick: enter `Loading`, then publish a fresh snapshot
    /// or surface the failure. There is no backoff; the next tick is an
    /// independent attempt.
    async fn tick(&self) {
        self.state.state.write().unwrap().begin();
        match self.collect_snapshot().await {
            Ok(snapshot) => {
                tracing::info!(
                    "Refreshed {} nodes, {} pods, {} hardware nodes",
                    snapshot.nodes.len(),
                    snapshot.pods.len(),
                    snapshot.hardware.len()
                );
                self.state.state.write().unwrap().complete(snapshot);
            },
            Err(err) => {
                tracing::error!("Refresh failed: {:#}", err);
                self.state.state.write().unwrap().fail(format!("{:#}", err));
            },
        }
    }

    /// Run the three aggregation pipelines concurrently. Query failures
    /// are degraded to empty families inside the collector; an error
    /// here means a pipeline itself died, and the whole tick fails
    /// rather than publishing a partial snapshot.
    async fn collect_snapshot(&self) -> Result<Snapshot> {
        let nodes = tokio::spawn({
            let collector = self.collector.clone();
            async move { collector.collect_nodes().await }
        });
        let pods = tokio::spawn({
            let collector = self.collector.clone();
            async move { collector.collect_pods().await }
        });
        let hardware = tokio::spawn({
            let collector = self.collector.clone();
            async move { collector.collect_hardware().await }
        });
        let (nodes, pods, hardware) = join!(nodes, pods, hardware);

        Ok(Snapshot {
            nodes: nodes.with_context(|| "Node aggregation died".to_string())?,
            pods: pods.with_context(|| "Pod aggregation died".to_string())?,
            hardware: hardware.with_context(|| "Hardware aggregation died".to_string())?,
            updated_at: Local::now().naive_utc(),
        })
    }
}
