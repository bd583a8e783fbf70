//! Aggregate reporter
//!
//! After every committed mutation the vault pushes its totals to an
//! external state aggregator. Delivery is best-effort: failures are logged
//! and counted, never propagated, and never roll back the mutation.

use crate::errors::AggregatorError;
use crate::ledger::SystemTotals;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use types::numeric::Amount;

/// Payload pushed to the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStateUpdate {
    pub total_collateral: Amount,
    pub total_debt: Amount,
    pub active_positions: u64,
    /// Always zero; the vault has no order book
    pub total_orders: u64,
}

impl From<&SystemTotals> for SystemStateUpdate {
    fn from(totals: &SystemTotals) -> Self {
        Self {
            total_collateral: totals.total_collateral,
            total_debt: totals.total_debt,
            active_positions: totals.active_positions,
            total_orders: 0,
        }
    }
}

/// External sink for system-wide state
pub trait StateAggregator: Send + Sync + fmt::Debug {
    fn update_system_state(&self, update: &SystemStateUpdate) -> Result<(), AggregatorError>;
}

/// Pushes totals to a [`StateAggregator`] and tracks delivery health.
#[derive(Debug)]
pub struct AggregateReporter {
    sink: Arc<dyn StateAggregator>,
    consecutive_failures: u32,
    alert_threshold: u32,
    reports_sent: u64,
}

impl AggregateReporter {
    pub fn new(sink: Arc<dyn StateAggregator>, alert_threshold: u32) -> Self {
        Self {
            sink,
            consecutive_failures: 0,
            alert_threshold,
            reports_sent: 0,
        }
    }

    /// Push `totals`. Returns whether the aggregator accepted the update.
    pub fn report(&mut self, totals: &SystemTotals) -> bool {
        let update = SystemStateUpdate::from(totals);
        match self.sink.update_system_state(&update) {
            Ok(()) => {
                if self.consecutive_failures > 0 {
                    info!(
                        failures = self.consecutive_failures,
                        "state aggregator recovered"
                    );
                }
                self.consecutive_failures = 0;
                self.reports_sent += 1;
                debug!(
                    total_collateral = %update.total_collateral,
                    total_debt = %update.total_debt,
                    active_positions = update.active_positions,
                    "reported system state"
                );
                true
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    "state aggregator update failed"
                );
                if self.alert_threshold > 0 && self.consecutive_failures == self.alert_threshold {
                    error!(
                        consecutive_failures = self.consecutive_failures,
                        "state aggregator unavailable, reports are being dropped"
                    );
                }
                false
            }
        }
    }

    pub fn set_sink(&mut self, sink: Arc<dyn StateAggregator>) {
        self.sink = sink;
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn reports_sent(&self) -> u64 {
        self.reports_sent
    }
}

/// In-memory aggregator that keeps the latest update.
///
/// `set_failing(true)` makes every update fail, for exercising the
/// reporter's failure path.
#[derive(Debug, Default)]
pub struct RecordingAggregator {
    last: Mutex<Option<SystemStateUpdate>>,
    updates: AtomicU64,
    failing: AtomicBool,
}

impl RecordingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_update(&self) -> Option<SystemStateUpdate> {
        self.last.lock().ok().and_then(|last| *last)
    }

    pub fn update_count(&self) -> u64 {
        self.updates.load(Ordering::SeqCst)
    }
}

impl StateAggregator for RecordingAggregator {
    fn update_system_state(&self, update: &SystemStateUpdate) -> Result<(), AggregatorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AggregatorError::Unreachable {
                reason: "aggregator offline".to_string(),
            });
        }
        let mut last = self.last.lock().map_err(|_| AggregatorError::Rejected {
            reason: "recorder lock poisoned".to_string(),
        })?;
        *last = Some(*update);
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(collateral: u128, debt: u128, active: u64) -> SystemTotals {
        SystemTotals {
            total_collateral: Amount::new(collateral),
            total_debt: Amount::new(debt),
            active_positions: active,
            last_interest_update: 0,
        }
    }

    #[test]
    fn test_report_delivers_totals() {
        let sink = Arc::new(RecordingAggregator::new());
        let mut reporter = AggregateReporter::new(sink.clone(), 3);

        assert!(reporter.report(&totals(100, 40, 2)));
        let update = sink.last_update().unwrap();
        assert_eq!(update.total_collateral, Amount::new(100));
        assert_eq!(update.total_debt, Amount::new(40));
        assert_eq!(update.active_positions, 2);
        assert_eq!(update.total_orders, 0);
        assert_eq!(reporter.reports_sent(), 1);
    }

    #[test]
    fn test_failures_counted_and_reset() {
        let sink = Arc::new(RecordingAggregator::new());
        let mut reporter = AggregateReporter::new(sink.clone(), 2);

        sink.set_failing(true);
        assert!(!reporter.report(&totals(1, 0, 1)));
        assert!(!reporter.report(&totals(2, 0, 1)));
        assert!(!reporter.report(&totals(3, 0, 1)));
        assert_eq!(reporter.consecutive_failures(), 3);
        assert_eq!(sink.update_count(), 0);

        sink.set_failing(false);
        assert!(reporter.report(&totals(4, 0, 1)));
        assert_eq!(reporter.consecutive_failures(), 0);
        assert_eq!(sink.last_update().unwrap().total_collateral, Amount::new(4));
    }

    #[test]
    fn test_set_sink_clears_failures() {
        let failing = Arc::new(RecordingAggregator::new());
        failing.set_failing(true);
        let mut reporter = AggregateReporter::new(failing, 3);
        reporter.report(&totals(1, 0, 1));
        assert_eq!(reporter.consecutive_failures(), 1);

        let healthy = Arc::new(RecordingAggregator::new());
        reporter.set_sink(healthy.clone());
        assert_eq!(reporter.consecutive_failures(), 0);
        assert!(reporter.report(&totals(1, 0, 1)));
        assert_eq!(healthy.update_count(), 1);
    }

    #[test]
    fn test_update_serialization() {
        let update = SystemStateUpdate::from(&totals(10, 5, 1));
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(
            json,
            r#"{"total_collateral":"10","total_debt":"5","active_positions":1,"total_orders":0}"#
        );
    }
}
