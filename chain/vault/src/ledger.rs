//! Position ledger and system totals
//!
//! Pure storage: the ledger does not validate balances or ratios. Callers
//! stage a new position with [`Ledger::stage`], which computes the resulting
//! totals with checked arithmetic, then [`Ledger::commit`] writes both.
//! Commit cannot fail, so an operation that reaches it applies in full.
//!
//! Invariant: `totals.total_collateral` and `totals.total_debt` equal the
//! sums over stored positions, and `active_positions` counts non-inert ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::errors::MathError;
use types::ids::AccountId;
use types::numeric::Amount;
use types::position::Position;

/// Aggregate state across every position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTotals {
    pub total_collateral: Amount,
    /// Sum of stored debt principals (interest is included once accrued)
    pub total_debt: Amount,
    pub active_positions: u64,
    /// Latest `now` seen by any mutating operation
    pub last_interest_update: u64,
}

/// A position update with its precomputed totals, ready to commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedEntry {
    pub account: AccountId,
    pub position: Position,
    pub totals: SystemTotals,
}

/// Point-in-time copy of the ledger, ordered by account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub positions: Vec<(AccountId, Position)>,
    pub totals: SystemTotals,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    positions: HashMap<AccountId, Position>,
    totals: SystemTotals,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored position, or the zero position for unknown accounts.
    pub fn get(&self, account: &AccountId) -> Position {
        self.positions.get(account).copied().unwrap_or_default()
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.positions.contains_key(account)
    }

    /// Overwrite a position without touching totals.
    pub fn set(&mut self, account: AccountId, position: Position) {
        self.positions.insert(account, position);
    }

    /// Overwrite the system totals.
    pub fn upsert_totals(&mut self, totals: SystemTotals) {
        self.totals = totals;
    }

    pub fn totals(&self) -> SystemTotals {
        self.totals
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.positions.keys()
    }

    /// Compute the totals that result from replacing `account`'s position
    /// with `next`. Nothing is written.
    pub fn stage(
        &self,
        account: AccountId,
        next: Position,
        now: u64,
    ) -> Result<StagedEntry, MathError> {
        let prev = self.get(&account);
        let mut totals = self.totals;

        totals.total_collateral = totals
            .total_collateral
            .checked_sub(prev.collateral)?
            .checked_add(next.collateral)?;
        totals.total_debt = totals
            .total_debt
            .checked_sub(prev.debt)?
            .checked_add(next.debt)?;

        totals.active_positions = match (prev.is_inert(), next.is_inert()) {
            (true, false) => totals
                .active_positions
                .checked_add(1)
                .ok_or(MathError::Overflow)?,
            (false, true) => totals
                .active_positions
                .checked_sub(1)
                .ok_or(MathError::Underflow)?,
            _ => totals.active_positions,
        };
        totals.last_interest_update = totals.last_interest_update.max(now);

        Ok(StagedEntry {
            account,
            position: next,
            totals,
        })
    }

    /// Apply a staged entry.
    pub fn commit(&mut self, staged: StagedEntry) {
        self.set(staged.account, staged.position);
        self.upsert_totals(staged.totals);
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut positions: Vec<(AccountId, Position)> =
            self.positions.iter().map(|(k, v)| (*k, *v)).collect();
        positions.sort_by_key(|(account, _)| *account);
        LedgerSnapshot {
            positions,
            totals: self.totals,
        }
    }
}
