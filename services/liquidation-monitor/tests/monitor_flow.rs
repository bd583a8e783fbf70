//! Monitor + vault integration
//!
//! Drives a shared vault through a price shock and lets the monitor find
//! and liquidate the unhealthy positions.

use liquidation_monitor::engine::{LiquidationMonitor, MonitorConfig};
use liquidation_monitor::handle::{Clock, ManualClock, VaultHandle};
use liquidation_monitor::events::RiskEventType;
use proptest::prelude::*;
use std::sync::Arc;
use types::ids::{AccountId, AssetId};
use types::numeric::{Amount, Price};
use vault::config::VaultConfig;
use vault::oracle::StaticPriceOracle;
use vault::reporter::RecordingAggregator;
use vault::vault::Vault;

const T0: u64 = 1_700_000_000;

fn weth() -> AssetId {
    AssetId::new("WETH")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

fn setup_handle(price: Price) -> (VaultHandle, Arc<StaticPriceOracle>) {
    init_tracing();
    let oracle = Arc::new(StaticPriceOracle::with_price(weth(), price));
    let mut vault = Vault::new(
        VaultConfig::default(),
        AccountId::new(),
        oracle.clone(),
        Arc::new(RecordingAggregator::new()),
    )
    .unwrap();
    vault.fund_reserve(Amount::new(1_000_000_000)).unwrap();
    (VaultHandle::new(vault), oracle)
}

#[test]
fn test_price_shock_then_sweep() {
    let (handle, oracle) = setup_handle(Price::new(200_000_000));
    let clock = ManualClock::new(T0);

    // Ten borrowers at increasing leverage
    let borrowers: Vec<AccountId> = (0..10u128)
        .map(|i| {
            let user = AccountId::new();
            handle
                .write(|vault| {
                    vault.deposit(user, Amount::new(10_000), clock.now())?;
                    // limit at $2 is 13_333
                    vault.borrow(user, Amount::new(8_000 + i * 500), clock.now())
                })
                .unwrap()
                .unwrap();
            user
        })
        .collect();

    oracle.set_price(weth(), Price::new(140_000_000));
    clock.advance(3_600);

    let monitor = LiquidationMonitor::with_config(MonitorConfig::default());
    let report = handle
        .read(|vault| monitor.scan(vault, clock.now()))
        .unwrap()
        .unwrap();
    assert_eq!(report.positions_scanned, borrowers.len());
    assert!(!report.candidates.is_empty());
    for pair in report.candidates.windows(2) {
        assert!(pair[0].health_factor <= pair[1].health_factor);
    }

    let keeper = AccountId::new();
    let summary = handle
        .write(|vault| monitor.liquidate_candidates(vault, keeper, &report.candidates, clock.now()))
        .unwrap();
    assert_eq!(summary.executed, report.candidates.len());
    assert_eq!(summary.failed, 0);

    // Ledger totals still match the per-position sums
    let snapshot = handle.snapshot().unwrap();
    let collateral: u128 = snapshot.positions.iter().map(|(_, p)| p.collateral.raw()).sum();
    let debt: u128 = snapshot.positions.iter().map(|(_, p)| p.debt.raw()).sum();
    assert_eq!(snapshot.totals.total_collateral.raw(), collateral);
    assert_eq!(snapshot.totals.total_debt.raw(), debt);

    // Fully repaid candidates drop out of the next scan
    let rescan = handle
        .read(|vault| monitor.scan(vault, clock.now()))
        .unwrap()
        .unwrap();
    assert!(rescan.candidates.len() < report.candidates.len());
}

proptest! {
    /// A candidate is reported exactly when the vault says the position is
    /// liquidatable.
    #[test]
    fn prop_candidates_match_vault_verdict(
        debt in 1u128..=13_333u128,
        price in 10_000_000u128..=400_000_000u128,
    ) {
        let (handle, oracle) = setup_handle(Price::new(200_000_000));
        let user = AccountId::new();
        handle
            .write(|vault| {
                vault.deposit(user, Amount::new(10_000), T0)?;
                vault.borrow(user, Amount::new(debt), T0)
            })
            .unwrap()
            .unwrap();
        oracle.set_price(weth(), Price::new(price));

        let monitor = LiquidationMonitor::new();
        let report = handle.read(|vault| monitor.scan(vault, T0)).unwrap().unwrap();
        let liquidatable = handle.read(|vault| vault.is_liquidatable(&user, T0)).unwrap().unwrap();
        prop_assert_eq!(report.candidates.len() == 1, liquidatable);

        let level_is_candidate = report
            .events
            .iter()
            .any(|e| matches!(e.event_type, RiskEventType::LiquidationCandidate { .. }));
        prop_assert_eq!(level_is_candidate, liquidatable);
    }
}
