//! Simulation report export
//!
//! Serializes scenario results and flow metrics to JSON for external
//! consumption.

use serde::{Deserialize, Serialize};

use crate::engine::SimEngine;
use crate::metrics::SimMetrics;
use crate::scenarios::ScenarioResult;

/// Combined export containing all simulation outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationExport {
    pub version: String,
    pub vault_abi_version: String,
    pub metrics: SimMetrics,
    pub scenarios: Vec<ScenarioResult>,
    pub event_count: usize,
    /// JSON of the final vault totals
    pub totals_json: Option<String>,
}

/// Build an export from an engine's event log and the scenario results
/// it produced.
pub fn build_export(engine: &SimEngine, scenarios: Vec<ScenarioResult>) -> SimulationExport {
    let mut metrics = SimMetrics::new();
    metrics.ingest(&engine.events);
    SimulationExport {
        version: crate::VERSION.to_string(),
        vault_abi_version: vault::VAULT_ABI_VERSION.to_string(),
        metrics,
        scenarios,
        event_count: engine.events.len(),
        totals_json: serde_json::to_string(&engine.vault().totals()).ok(),
    }
}

pub fn export_json(export: &SimulationExport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(export)
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: &str) -> std::io::Result<()> {
    let json = export_json(export)?;
    std::fs::write(path, json)
}
