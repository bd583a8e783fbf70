//! Liquidation monitor orchestrator
//!
//! Scans every position in a vault, bands its health, emits risk events,
//! and sizes liquidation candidates. Can also execute liquidations for the
//! candidates it found.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use types::ids::AccountId;
use types::numeric::Amount;
use vault::errors::VaultError;
use vault::ledger::SystemTotals;
use vault::valuation;
use vault::vault::Vault;

use crate::errors::MonitorError;
use crate::events::{self, RiskEvent};
use crate::health::{self, HealthBands, HealthLevel};

/// Liquidation monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub bands: HealthBands,
    /// Milliseconds between scans in the service loop
    pub scan_interval_ms: u64,
    /// Candidates kept per scan, worst first
    pub max_candidates: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bands: HealthBands::default(),
            scan_interval_ms: 1_000,
            max_candidates: 100,
        }
    }
}

/// A liquidatable position and the largest repayment that fits its collateral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationCandidate {
    pub account: AccountId,
    pub health_factor: u128,
    pub collateral: Amount,
    pub debt: Amount,
    pub max_debt_to_cover: Amount,
}

/// Result of one pass over the vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scanned_at: u64,
    pub positions_scanned: usize,
    pub warnings: usize,
    pub dangers: usize,
    /// Worst health factor first
    pub candidates: Vec<LiquidationCandidate>,
    pub events: Vec<RiskEvent>,
    pub totals: SystemTotals,
}

/// Outcome of executing liquidations for a batch of candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidationSummary {
    pub executed: usize,
    pub failed: usize,
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
}

#[derive(Debug, Clone, Default)]
pub struct LiquidationMonitor {
    config: MonitorConfig,
}

impl LiquidationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Evaluate every position at `now`. Fails as a whole if the vault
    /// cannot value a position (e.g. oracle outage).
    pub fn scan(&self, vault: &Vault, now: u64) -> Result<ScanReport, MonitorError> {
        let precision = vault.config().precision;
        let timestamp = i64::try_from(now).unwrap_or(i64::MAX);
        let mut report = ScanReport {
            scanned_at: now,
            positions_scanned: 0,
            warnings: 0,
            dangers: 0,
            candidates: Vec::new(),
            events: Vec::new(),
            totals: vault.totals(),
        };

        for account in vault.accounts() {
            report.positions_scanned += 1;
            let view = vault.get_position(&account, now)?;
            if view.debt.is_zero() {
                continue;
            }

            let liquidatable = valuation::is_liquidatable(view.health_factor, vault.config());
            let ratio = health::health_ratio(view.health_factor, precision);
            let level = health::health_status(liquidatable, ratio, &self.config.bands);
            let max_debt_to_cover = if liquidatable {
                vault.get_max_liquidatable_debt(&account, now)?
            } else {
                Amount::ZERO
            };

            match level {
                HealthLevel::Healthy => {}
                HealthLevel::Warning => report.warnings += 1,
                HealthLevel::Danger => report.dangers += 1,
                HealthLevel::Liquidatable => report.candidates.push(LiquidationCandidate {
                    account,
                    health_factor: view.health_factor,
                    collateral: view.collateral,
                    debt: view.debt,
                    max_debt_to_cover,
                }),
            }
            report.events.extend(events::events_for_health(
                account,
                level,
                ratio,
                view.collateral,
                view.debt,
                max_debt_to_cover,
                timestamp,
            ));
        }

        report
            .candidates
            .sort_by_key(|candidate| (candidate.health_factor, candidate.account));
        report.candidates.truncate(self.config.max_candidates);

        debug!(
            scanned = report.positions_scanned,
            warnings = report.warnings,
            dangers = report.dangers,
            candidates = report.candidates.len(),
            "scan complete"
        );
        Ok(report)
    }

    /// Liquidate each candidate for its sized maximum. Candidates that are
    /// no longer liquidatable or fail for any other reason are skipped.
    pub fn liquidate_candidates(
        &self,
        vault: &mut Vault,
        liquidator: AccountId,
        candidates: &[LiquidationCandidate],
        now: u64,
    ) -> LiquidationSummary {
        let mut summary = LiquidationSummary::default();
        for candidate in candidates {
            let outcome = vault
                .get_max_liquidatable_debt(&candidate.account, now)
                .and_then(|cover| {
                    if cover.is_zero() {
                        return Err(VaultError::NotLiquidatable {
                            health_factor: candidate.health_factor,
                        });
                    }
                    let before = vault.position(&candidate.account);
                    vault.liquidate(liquidator, candidate.account, cover, now)?;
                    Ok((before, vault.position(&candidate.account), cover))
                });

            match outcome {
                Ok((before, after, cover)) => {
                    summary.executed += 1;
                    summary.debt_repaid = summary.debt_repaid.saturating_add(cover);
                    let seized = before.collateral.saturating_sub(after.collateral);
                    summary.collateral_seized = summary.collateral_seized.saturating_add(seized);
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(account = %candidate.account, error = %e, "liquidation skipped");
                }
            }
        }
        if summary.executed > 0 {
            info!(
                executed = summary.executed,
                failed = summary.failed,
                debt_repaid = %summary.debt_repaid,
                collateral_seized = %summary.collateral_seized,
                "liquidation batch complete"
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RiskEventType;
    use std::sync::Arc;
    use types::ids::AssetId;
    use types::numeric::Price;
    use vault::config::VaultConfig;
    use vault::oracle::StaticPriceOracle;
    use vault::reporter::RecordingAggregator;

    const T0: u64 = 1_700_000_000;

    fn usd_cents(cents: u128) -> Price {
        Price::new(cents * 1_000_000)
    }

    fn setup_vault() -> (Vault, Arc<StaticPriceOracle>) {
        let oracle = Arc::new(StaticPriceOracle::with_price(AssetId::new("WETH"), usd_cents(150)));
        let mut vault = Vault::new(
            VaultConfig::default(),
            AccountId::new(),
            oracle.clone(),
            Arc::new(RecordingAggregator::new()),
        )
        .unwrap();
        vault.fund_reserve(Amount::new(1_000_000)).unwrap();
        (vault, oracle)
    }

    fn open(vault: &mut Vault, collateral: u128, debt: u128) -> AccountId {
        let user = AccountId::new();
        vault.deposit(user, Amount::new(collateral), T0).unwrap();
        if debt > 0 {
            vault.borrow(user, Amount::new(debt), T0).unwrap();
        }
        user
    }

    #[test]
    fn test_scan_bands_positions() {
        let (mut vault, oracle) = setup_vault();
        let idle = open(&mut vault, 1000, 0);
        let safe = open(&mut vault, 3000, 1000);
        let thin = open(&mut vault, 1140, 1000);
        oracle.set_price(AssetId::new("WETH"), usd_cents(100));

        let report = LiquidationMonitor::new().scan(&vault, T0).unwrap();
        assert_eq!(report.positions_scanned, 3);
        // safe: 3000 / 1000 = 300% -> hf 2.5, healthy
        assert_eq!(report.warnings, 0);
        assert_eq!(report.candidates.len(), 1);
        let candidate = report.candidates[0];
        assert_eq!(candidate.account, thin);
        assert_eq!(candidate.health_factor, 95);
        assert_eq!(candidate.max_debt_to_cover, Amount::new(1000));
        assert!(report.events.iter().all(|e| e.account_id != Some(idle)));
        assert!(report.events.iter().all(|e| e.account_id != Some(safe)));
        assert!(matches!(
            report.events[0].event_type,
            RiskEventType::LiquidationCandidate { .. }
        ));
    }

    #[test]
    fn test_scan_warning_and_danger() {
        let (mut vault, oracle) = setup_vault();
        // At $1: 1560 / 1000 -> hf 1.30 (warning), 1250 / 1000 -> hf 1.04 (danger)
        open(&mut vault, 1560, 1000);
        open(&mut vault, 1250, 1000);
        oracle.set_price(AssetId::new("WETH"), usd_cents(100));
        let report = LiquidationMonitor::new().scan(&vault, T0).unwrap();
        assert_eq!(report.warnings, 1);
        assert_eq!(report.dangers, 1);
        assert!(report.candidates.is_empty());
        assert_eq!(report.events.len(), 2);
    }

    #[test]
    fn test_candidates_sorted_and_truncated() {
        let (mut vault, oracle) = setup_vault();
        let mild = open(&mut vault, 1400, 900);
        let severe = open(&mut vault, 1200, 1000);
        oracle.set_price(AssetId::new("WETH"), usd_cents(75));

        let monitor = LiquidationMonitor::with_config(MonitorConfig {
            max_candidates: 1,
            ..Default::default()
        });
        let report = monitor.scan(&vault, T0).unwrap();
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].account, severe);
        assert_ne!(report.candidates[0].account, mild);
    }

    #[test]
    fn test_scan_fails_on_oracle_outage() {
        let (mut vault, oracle) = setup_vault();
        open(&mut vault, 1140, 1000);
        oracle.remove_price(&AssetId::new("WETH"));
        let err = LiquidationMonitor::new().scan(&vault, T0).unwrap_err();
        assert!(matches!(err, MonitorError::Vault(VaultError::Oracle(_))));
    }

    #[test]
    fn test_liquidate_candidates() {
        let (mut vault, oracle) = setup_vault();
        let thin = open(&mut vault, 1140, 1000);
        oracle.set_price(AssetId::new("WETH"), usd_cents(100));

        let monitor = LiquidationMonitor::new();
        let report = monitor.scan(&vault, T0).unwrap();
        let keeper = AccountId::new();
        let summary = monitor.liquidate_candidates(&mut vault, keeper, &report.candidates, T0);

        assert_eq!(summary.executed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.debt_repaid, Amount::new(1000));
        assert_eq!(summary.collateral_seized, Amount::new(1100));
        assert_eq!(vault.position(&thin).collateral, Amount::new(40));
        assert!(vault.position(&thin).debt.is_zero());

        // A second pass finds nothing to do
        let summary = monitor.liquidate_candidates(&mut vault, keeper, &report.candidates, T0);
        assert_eq!(summary.executed, 0);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_monitor_config_from_json() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"scan_interval_ms": 250}"#).unwrap();
        assert_eq!(config.scan_interval_ms, 250);
        assert_eq!(config.max_candidates, 100);
        assert_eq!(config.bands, HealthBands::default());
    }
}
