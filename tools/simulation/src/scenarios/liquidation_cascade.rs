//! Liquidation cascade test
//!
//! Opens leveraged positions, drops the collateral price, and lets the
//! monitor sweep liquidations round by round until nothing is left to do.
//! A cascade is flagged when the share of liquidated accounts reaches the
//! configured threshold within the sweep window.

use liquidation_monitor::engine::{LiquidationMonitor, LiquidationSummary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};
use types::ids::AccountId;
use types::numeric::Amount;
use vault::events::VaultEvent;

use crate::engine::SimEngine;
use crate::metrics::SimMetrics;
use crate::scenarios::ScenarioResult;

/// Configuration for the liquidation cascade scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidationCascadeConfig {
    pub account_count: usize,
    /// Inclusive collateral range per account
    pub collateral_min: u128,
    pub collateral_max: u128,
    /// Inclusive share of the borrow limit drawn, in percent
    pub utilization_min_pct: u128,
    pub utilization_max_pct: u128,
    /// Collateral price drop applied after positions are open
    pub price_drop_bps: u128,
    /// Seconds between the shock and the sweep
    pub sweep_delay_secs: u64,
    /// Upper bound on scan/liquidate rounds
    pub max_rounds: u32,
    /// Fraction of accounts liquidated that counts as a cascade
    pub cascade_threshold: Decimal,
}

impl Default for LiquidationCascadeConfig {
    fn default() -> Self {
        Self {
            account_count: 20,
            collateral_min: 1_000,
            collateral_max: 50_000,
            utilization_min_pct: 80,
            utilization_max_pct: 100,
            price_drop_bps: 3_000,
            sweep_delay_secs: 300,
            max_rounds: 4,
            cascade_threshold: Decimal::new(5, 2),
        }
    }
}

/// Result detail for the liquidation cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeDetail {
    pub total_positions: usize,
    pub liquidated_count: usize,
    pub liquidation_ratio: Decimal,
    pub cascade_detected: bool,
    pub rounds: u32,
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
    /// Debt still sitting on liquidatable positions after the sweep
    pub bad_debt: Amount,
}

/// Run the liquidation cascade scenario.
pub fn run(
    engine: &mut SimEngine,
    config: &LiquidationCascadeConfig,
) -> (ScenarioResult, CascadeDetail) {
    let mut failures: Vec<String> = Vec::new();
    let events_before = engine.events.len();

    let mut opened = 0u64;
    for _ in 0..config.account_count {
        match engine.open_random_position(
            (config.collateral_min, config.collateral_max),
            (config.utilization_min_pct, config.utilization_max_pct),
        ) {
            Ok(_) => opened += 1,
            Err(e) => failures.push(format!("open failed: {e}")),
        }
    }

    let totals_before = engine.vault().totals();
    let reserve_before = engine.vault().reserve();

    if let Err(e) = engine.shock_price(config.price_drop_bps) {
        failures.push(format!("price shock failed: {e}"));
    }
    engine.advance(config.sweep_delay_secs);

    let monitor = LiquidationMonitor::new();
    let keeper = engine.keeper();
    let mut swept = LiquidationSummary::default();
    let mut rounds = 0u32;
    while rounds < config.max_rounds {
        let now = engine.now();
        let report = match monitor.scan(engine.vault(), now) {
            Ok(report) => report,
            Err(e) => {
                failures.push(format!("scan failed: {e}"));
                break;
            }
        };
        if report.candidates.is_empty() {
            break;
        }
        rounds += 1;
        let summary =
            monitor.liquidate_candidates(engine.vault_mut(), keeper, &report.candidates, now);
        engine.collect_events();
        swept.executed += summary.executed;
        swept.failed += summary.failed;
        swept.debt_repaid = swept.debt_repaid.saturating_add(summary.debt_repaid);
        swept.collateral_seized = swept.collateral_seized.saturating_add(summary.collateral_seized);
        if summary.executed == 0 {
            break;
        }
    }

    let new_events = &engine.events[events_before..];
    let liquidated: BTreeSet<AccountId> = new_events
        .iter()
        .filter_map(|event| match event {
            VaultEvent::Liquidated(e) => Some(e.user),
            _ => None,
        })
        .collect();
    let mut metrics = SimMetrics::new();
    metrics.ingest(new_events);

    // Conservation across the sweep
    let totals_after = engine.vault().totals();
    let reserve_after = engine.vault().reserve();
    if reserve_after != reserve_before.saturating_add(swept.debt_repaid) {
        failures.push(format!(
            "reserve moved {reserve_before} -> {reserve_after}, repaid {}",
            swept.debt_repaid
        ));
    }
    if totals_after.total_collateral
        != totals_before
            .total_collateral
            .saturating_sub(swept.collateral_seized)
    {
        failures.push("collateral does not reconcile with seizures".to_string());
    }
    if metrics.total_liquidated_debt != swept.debt_repaid {
        failures.push("liquidation events disagree with sweep summary".to_string());
    }
    if !engine.ledger_consistent() {
        failures.push("totals diverge from positions".to_string());
    }

    let now = engine.now();
    let vault = engine.vault();
    let bad_debt = vault
        .accounts()
        .iter()
        .filter(|account| vault.is_liquidatable(account, now).unwrap_or(false))
        .fold(Amount::ZERO, |acc, account| {
            acc.saturating_add(vault.position(account).debt)
        });

    let liquidation_ratio = if config.account_count > 0 {
        Decimal::from(liquidated.len() as u64) / Decimal::from(config.account_count as u64)
    } else {
        Decimal::ZERO
    };
    let cascade_detected = liquidation_ratio >= config.cascade_threshold;
    if cascade_detected {
        warn!(
            liquidated = liquidated.len(),
            accounts = config.account_count,
            ratio = %liquidation_ratio,
            "liquidation cascade detected"
        );
    }

    let detail = CascadeDetail {
        total_positions: config.account_count,
        liquidated_count: liquidated.len(),
        liquidation_ratio,
        cascade_detected,
        rounds,
        debt_repaid: swept.debt_repaid,
        collateral_seized: swept.collateral_seized,
        bad_debt,
    };

    let passed = failures.is_empty();
    info!(
        liquidated = detail.liquidated_count,
        rounds,
        passed,
        "liquidation cascade finished"
    );

    let result = ScenarioResult {
        name: "liquidation_cascade".to_string(),
        steps_run: u64::from(rounds),
        positions_opened: opened,
        liquidations_executed: swept.executed as u64,
        events_emitted: engine.events.len(),
        passed,
        details: if passed {
            format!(
                "{} of {} accounts liquidated over {} rounds (ratio {}), cascade={}",
                detail.liquidated_count,
                detail.total_positions,
                rounds,
                liquidation_ratio,
                cascade_detected
            )
        } else {
            failures.join("; ")
        },
    };

    (result, detail)
}
