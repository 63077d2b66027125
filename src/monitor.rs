use crate::alerts;
use crate::collectors::{MetricsSource, SampleError};
use crate::history::HistoryStore;
use crate::snapshot::{now_unix, HostInfo, InterfaceStat, ProcessInfo, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Owns the metrics source and the history store and exposes the three
/// query operations the HTTP layer needs. The collector loop and any
/// number of request handlers share one instance behind an `Arc`.
pub struct Monitor {
    source: Mutex<Box<dyn MetricsSource>>,
    history: Arc<HistoryStore>,
    started_at_unix: i64,
}

impl Monitor {
    pub fn new(source: Box<dyn MetricsSource>, history: Arc<HistoryStore>) -> Self {
        Self {
            source: Mutex::new(source),
            history,
            started_at_unix: now_unix(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        now_unix().saturating_sub(self.started_at_unix).max(0) as u64
    }

    /// Samples every block right now, independent of the collector's
    /// schedule. A failed block degrades to its zero value (`None` for
    /// the network block) and the snapshot is still assembled.
    pub async fn live_snapshot(&self) -> Snapshot {
        let mut source = self.source.lock().await;

        let host = source.sample_host().unwrap_or_else(|err| {
            warn!(error = %err, "host sample failed");
            HostInfo::default()
        });
        let cpu = source.sample_cpu().unwrap_or_else(|err| {
            warn!(error = %err, "cpu sample failed");
            Default::default()
        });
        let memory = source.sample_memory().unwrap_or_else(|err| {
            warn!(error = %err, "memory sample failed");
            Default::default()
        });
        let disk = source.sample_disk().unwrap_or_else(|err| {
            warn!(error = %err, "disk sample failed");
            Default::default()
        });
        let network = match source.sample_network() {
            Ok(stat) => Some(stat),
            Err(err) => {
                warn!(error = %err, "network sample failed");
                None
            }
        };
        let mut system = source.sample_system().unwrap_or_else(|err| {
            warn!(error = %err, "system sample failed");
            Default::default()
        });
        drop(source);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let metrics = handle.metrics();
            system.tasks_alive = metrics.num_alive_tasks() as u64;
            system.worker_threads = metrics.num_workers() as u64;
        }

        let now = now_unix();
        let alerts = alerts::evaluate(cpu.percent, memory.percent, disk.percent, now);

        Snapshot {
            timestamp_unix: now,
            host,
            cpu,
            memory,
            disk,
            network,
            system,
            alerts,
        }
    }

    /// One collection cycle: sample, derive alerts, append to history.
    pub async fn tick(&self) {
        let snapshot = self.live_snapshot().await;
        if !snapshot.alerts.is_empty() {
            debug!(count = snapshot.alerts.len(), "threshold alerts raised");
        }
        self.history.append(snapshot).await;
        let len = self.history.len().await;
        debug!(len, "snapshot appended");
    }

    pub async fn history(&self, limit: Option<usize>) -> Vec<Snapshot> {
        self.history.read(limit).await
    }

    pub async fn host_info(&self) -> Result<HostInfo, SampleError> {
        self.source.lock().await.sample_host()
    }

    pub async fn processes(&self) -> Result<Vec<ProcessInfo>, SampleError> {
        self.source.lock().await.list_processes()
    }

    pub async fn interfaces(&self) -> Result<Vec<InterfaceStat>, SampleError> {
        self.source.lock().await.list_interfaces()
    }
}

/// Periodic collection loop. Single task, so ticks never overlap: a slow
/// sample delays the following tick instead of racing it. Stops when the
/// shutdown channel flips.
pub async fn run_collector(
    monitor: Arc<Monitor>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("collector received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                monitor.tick().await;
            }
        }
    }
}
