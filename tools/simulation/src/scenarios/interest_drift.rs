//! Interest drift test
//!
//! Many borrowers, long horizon. Each step advances the clock, accrues a
//! random subset of positions and lets a few borrowers repay part of their
//! debt. The stored totals must keep matching the per-position sums, and
//! the debt implied by the event stream must match the ledger exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::ids::AccountId;
use types::numeric::Amount;

use crate::engine::SimEngine;
use crate::metrics::SimMetrics;
use crate::scenarios::ScenarioResult;

/// Configuration for the interest drift scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestDriftConfig {
    pub account_count: usize,
    pub steps: u64,
    pub step_secs: u64,
    pub collateral_min: u128,
    pub collateral_max: u128,
    pub utilization_min_pct: u128,
    pub utilization_max_pct: u128,
    /// Chance per account per step of an explicit accrual
    pub accrue_pct: u32,
    /// Chance per account per step of a partial repayment
    pub repay_pct: u32,
}

impl Default for InterestDriftConfig {
    fn default() -> Self {
        Self {
            account_count: 50,
            steps: 12,
            // 30 days
            step_secs: 2_592_000,
            collateral_min: 10_000,
            collateral_max: 1_000_000,
            utilization_min_pct: 10,
            utilization_max_pct: 60,
            accrue_pct: 50,
            repay_pct: 10,
        }
    }
}

/// Result detail for the interest drift scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestDriftDetail {
    pub principal_borrowed: Amount,
    pub total_interest: Amount,
    pub total_repaid: Amount,
    pub final_total_debt: Amount,
    /// Debt implied by borrow, interest and repay events
    pub expected_total_debt: Amount,
    pub accrual_calls: u64,
    pub repay_calls: u64,
    /// Steps after which totals diverged from the positions
    pub inconsistent_steps: u64,
}

/// Run the interest drift scenario.
pub fn run(
    engine: &mut SimEngine,
    config: &InterestDriftConfig,
) -> (ScenarioResult, InterestDriftDetail) {
    let mut failures: Vec<String> = Vec::new();
    let events_before = engine.events.len();

    let mut borrowers: Vec<AccountId> = Vec::with_capacity(config.account_count);
    for _ in 0..config.account_count {
        match engine.open_random_position(
            (config.collateral_min, config.collateral_max),
            (config.utilization_min_pct, config.utilization_max_pct),
        ) {
            Ok(user) => borrowers.push(user),
            Err(e) => failures.push(format!("open failed: {e}")),
        }
    }

    let mut accrual_calls = 0u64;
    let mut repay_calls = 0u64;
    let mut inconsistent_steps = 0u64;
    for step in 0..config.steps {
        let now = engine.advance(config.step_secs);
        for user in &borrowers {
            if engine.rng().gen_ratio(config.accrue_pct.min(100), 100) {
                accrual_calls += 1;
                if let Err(e) = engine.vault_mut().accrue_interest(*user, now) {
                    failures.push(format!("accrual failed at step {step}: {e}"));
                }
            }
            if engine.rng().gen_ratio(config.repay_pct.min(100), 100) {
                let debt = engine.vault().position(user).debt.raw();
                if debt == 0 {
                    continue;
                }
                let amount = engine.rng().gen_range(1..=debt);
                repay_calls += 1;
                if let Err(e) = engine.vault_mut().repay(*user, Amount::new(amount), now) {
                    failures.push(format!("repay failed at step {step}: {e}"));
                }
            }
        }
        engine.collect_events();
        if !engine.ledger_consistent() {
            inconsistent_steps += 1;
        }
        debug!(step, total_debt = %engine.vault().totals().total_debt, "drift step");
    }

    // Settle everyone so the ledger carries all interest
    let now = engine.now();
    for user in &borrowers {
        if let Err(e) = engine.vault_mut().accrue_interest(*user, now) {
            failures.push(format!("final accrual failed: {e}"));
        }
    }
    engine.collect_events();

    let mut metrics = SimMetrics::new();
    metrics.ingest(&engine.events[events_before..]);
    let final_total_debt = engine.vault().totals().total_debt;
    let expected_total_debt = metrics.expected_debt();

    if inconsistent_steps > 0 {
        failures.push(format!("{inconsistent_steps} steps with diverging totals"));
    }
    if final_total_debt != expected_total_debt {
        failures.push(format!(
            "ledger debt {final_total_debt} != event debt {expected_total_debt}"
        ));
    }
    if !engine.ledger_consistent() {
        failures.push("totals diverge from positions after settlement".to_string());
    }

    let detail = InterestDriftDetail {
        principal_borrowed: metrics.total_borrowed,
        total_interest: metrics.total_interest,
        total_repaid: metrics.total_repaid,
        final_total_debt,
        expected_total_debt,
        accrual_calls,
        repay_calls,
        inconsistent_steps,
    };

    let passed = failures.is_empty();
    info!(
        interest = %detail.total_interest,
        total_debt = %final_total_debt,
        passed,
        "interest drift finished"
    );

    let result = ScenarioResult {
        name: "interest_drift".to_string(),
        steps_run: config.steps,
        positions_opened: borrowers.len() as u64,
        liquidations_executed: metrics.liquidations,
        events_emitted: engine.events.len(),
        passed,
        details: if passed {
            format!(
                "{} accruals, {} repayments, interest {} on principal {}",
                accrual_calls, repay_calls, detail.total_interest, detail.principal_borrowed
            )
        } else {
            failures.join("; ")
        },
    };

    (result, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_default_config() {
        let mut engine = SimEngine::with_seed(2_000, 5).unwrap();
        let (result, detail) = run(&mut engine, &InterestDriftConfig::default());
        assert!(result.passed, "{}", result.details);
        assert_eq!(result.positions_opened, 50);
        assert_eq!(detail.inconsistent_steps, 0);
        assert_eq!(detail.final_total_debt, detail.expected_total_debt);
        assert!(!detail.total_interest.is_zero());
    }

    #[test]
    fn test_no_time_no_interest() {
        let mut engine = SimEngine::with_seed(2_000, 5).unwrap();
        let config = InterestDriftConfig {
            step_secs: 0,
            repay_pct: 0,
            ..Default::default()
        };
        let (result, detail) = run(&mut engine, &config);
        assert!(result.passed, "{}", result.details);
        assert!(detail.total_interest.is_zero());
        assert_eq!(detail.final_total_debt, detail.principal_borrowed);
    }
}
