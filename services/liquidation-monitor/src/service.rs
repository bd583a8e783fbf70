//! Periodic scan loop
//!
//! `spawn_monitor` runs a tokio task that scans the vault on a fixed
//! interval and forwards risk events to a channel. The task stops when the
//! shutdown signal fires or the event receiver is dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::LiquidationMonitor;
use crate::errors::MonitorError;
use crate::events::{self, RiskEvent};
use crate::handle::{Clock, VaultHandle};

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub scans: u64,
    pub failed_scans: u64,
    pub events_sent: u64,
}

pub fn spawn_monitor(
    handle: VaultHandle,
    monitor: LiquidationMonitor,
    clock: Arc<dyn Clock>,
    events_tx: mpsc::Sender<RiskEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<MonitorStats> {
    tokio::spawn(async move {
        let period = Duration::from_millis(monitor.config().scan_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        let mut stats = MonitorStats::default();
        info!(interval_ms = period.as_millis() as u64, "liquidation monitor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let now = clock.now();
            let outgoing = match run_scan(&handle, &monitor, now) {
                Ok(found) => {
                    stats.scans += 1;
                    found
                }
                Err(e) => {
                    stats.failed_scans += 1;
                    warn!(error = %e, "scan failed");
                    let timestamp = i64::try_from(now).unwrap_or(i64::MAX);
                    vec![events::scan_failed_event(e.to_string(), timestamp)]
                }
            };

            for event in outgoing {
                if events_tx.send(event).await.is_err() {
                    error!("risk event receiver dropped, stopping monitor");
                    return stats;
                }
                stats.events_sent += 1;
            }
        }

        info!(
            scans = stats.scans,
            failed_scans = stats.failed_scans,
            events_sent = stats.events_sent,
            "liquidation monitor stopped"
        );
        stats
    })
}

fn run_scan(
    handle: &VaultHandle,
    monitor: &LiquidationMonitor,
    now: u64,
) -> Result<Vec<RiskEvent>, MonitorError> {
    let report = handle.read(|vault| monitor.scan(vault, now))??;
    Ok(report.events)
}
