//! Flow metrics for simulation
//!
//! Folds the vault's event stream into counters and token flows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::Amount;
use vault::events::VaultEvent;

/// Aggregated simulation metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub deposits: u64,
    pub withdrawals: u64,
    pub borrows: u64,
    pub repayments: u64,
    pub interest_accruals: u64,
    pub liquidations: u64,
    pub total_deposited: Amount,
    pub total_withdrawn: Amount,
    pub total_borrowed: Amount,
    pub total_repaid: Amount,
    pub total_interest: Amount,
    pub total_liquidated_debt: Amount,
    pub total_seized_collateral: Amount,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single event into metrics.
    pub fn record_event(&mut self, event: &VaultEvent) {
        match event {
            VaultEvent::Deposited(e) => {
                self.deposits += 1;
                self.total_deposited = self.total_deposited.saturating_add(e.amount);
            }
            VaultEvent::Withdrawn(e) => {
                self.withdrawals += 1;
                self.total_withdrawn = self.total_withdrawn.saturating_add(e.amount);
            }
            VaultEvent::Borrowed(e) => {
                self.borrows += 1;
                self.total_borrowed = self.total_borrowed.saturating_add(e.amount);
            }
            VaultEvent::Repaid(e) => {
                self.repayments += 1;
                self.total_repaid = self.total_repaid.saturating_add(e.amount);
            }
            VaultEvent::InterestAccrued(e) => {
                self.interest_accruals += 1;
                self.total_interest = self.total_interest.saturating_add(e.amount);
            }
            VaultEvent::Liquidated(e) => {
                self.liquidations += 1;
                self.total_liquidated_debt =
                    self.total_liquidated_debt.saturating_add(e.debt_repaid);
                self.total_seized_collateral =
                    self.total_seized_collateral.saturating_add(e.collateral_seized);
            }
            VaultEvent::Paused(_)
            | VaultEvent::Unpaused(_)
            | VaultEvent::OwnershipTransferred(_) => {}
        }
    }

    pub fn ingest(&mut self, events: &[VaultEvent]) {
        for event in events {
            self.record_event(event);
        }
    }

    /// Debt the event stream says is outstanding.
    pub fn expected_debt(&self) -> Amount {
        self.total_borrowed
            .saturating_add(self.total_interest)
            .saturating_sub(self.total_repaid)
            .saturating_sub(self.total_liquidated_debt)
    }

    /// Collateral the event stream says is held.
    pub fn expected_collateral(&self) -> Amount {
        self.total_deposited
            .saturating_sub(self.total_withdrawn)
            .saturating_sub(self.total_seized_collateral)
    }

    /// Share of borrowed principal cleared by liquidation.
    pub fn liquidated_share(&self) -> Decimal {
        let borrowed = Decimal::from_i128_with_scale(
            i128::try_from(self.total_borrowed.raw()).unwrap_or(i128::MAX),
            0,
        );
        if borrowed.is_zero() {
            return Decimal::ZERO;
        }
        let liquidated = Decimal::from_i128_with_scale(
            i128::try_from(self.total_liquidated_debt.raw()).unwrap_or(i128::MAX),
            0,
        );
        (liquidated / borrowed).round_dp(4)
    }
}
