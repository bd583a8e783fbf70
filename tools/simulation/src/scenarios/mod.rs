//! Scenario simulation modules
//!
//! Each scenario drives a vault through a stress pattern and checks that
//! the ledger still reconciles afterwards.

pub mod interest_drift;
pub mod liquidation_cascade;

use serde::{Deserialize, Serialize};

/// Result of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub steps_run: u64,
    pub positions_opened: u64,
    pub liquidations_executed: u64,
    pub events_emitted: usize,
    pub passed: bool,
    pub details: String,
}
