//! Vault: collateral custody, borrowing, interest and liquidation
//!
//! Every mutator follows the same shape:
//! 1. Guard checks (pause, amount, caller)
//! 2. Accrue interest on a copy of the position
//! 3. Validate and build the new position and reserve on copies
//! 4. Stage the ledger update (all fallible arithmetic happens here)
//! 5. Commit, record events, report totals
//!
//! Any error before step 5 leaves the vault exactly as it was.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::ids::AccountId;
use types::numeric::{Amount, Price};
use types::position::Position;

use crate::accrual;
use crate::config::VaultConfig;
use crate::errors::{OracleError, VaultError};
use crate::events::{
    Borrowed, Deposited, InterestAccrued, Liquidated, OwnershipTransferred, Paused, Repaid,
    Unpaused, VaultEvent, Withdrawn,
};
use crate::ledger::{Ledger, LedgerSnapshot, StagedEntry, SystemTotals};
use crate::liquidation;
use crate::oracle::PriceOracle;
use crate::reporter::{AggregateReporter, StateAggregator};
use crate::security::{Ownable, PauseGuard};
use crate::valuation::{self, HEALTH_FACTOR_MAX};

/// Position with interest accrued up to the query time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    pub collateral: Amount,
    pub debt: Amount,
    pub health_factor: u128,
}

/// Single-collateral lending vault.
///
/// Borrowers lock `config.collateral_asset` and draw `config.debt_asset`
/// from the lending reserve. Time is supplied by the caller as seconds and
/// must not move backwards across mutations.
#[derive(Debug)]
pub struct Vault {
    config: VaultConfig,
    ledger: Ledger,
    /// Debt token available for lending
    reserve: Amount,
    oracle: Arc<dyn PriceOracle>,
    reporter: AggregateReporter,
    ownable: Ownable,
    pause_guard: PauseGuard,
    /// Emitted events log (append-only)
    events: Vec<VaultEvent>,
}

impl Vault {
    pub fn new(
        config: VaultConfig,
        owner: AccountId,
        oracle: Arc<dyn PriceOracle>,
        aggregator: Arc<dyn StateAggregator>,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        info!(
            collateral_asset = %config.collateral_asset,
            debt_asset = %config.debt_asset,
            collateral_ratio = config.collateral_ratio,
            liquidation_threshold = config.liquidation_threshold,
            owner = %owner,
            "vault initialized"
        );
        let reporter = AggregateReporter::new(aggregator, config.report_failure_alert_threshold);
        Ok(Self {
            config,
            ledger: Ledger::new(),
            reserve: Amount::ZERO,
            oracle,
            reporter,
            ownable: Ownable::new(owner),
            pause_guard: PauseGuard::new(),
            events: Vec::new(),
        })
    }

    // ───────────────────────── Reserve ─────────────────────────

    /// Add debt token to the lending reserve. Returns the new reserve.
    pub fn fund_reserve(&mut self, amount: Amount) -> Result<Amount, VaultError> {
        ensure_positive(amount)?;
        self.reserve = self.reserve.checked_add(amount)?;
        info!(amount = %amount, reserve = %self.reserve, "reserve funded");
        Ok(self.reserve)
    }

    // ───────────────────────── Collateral ─────────────────────────

    pub fn deposit(
        &mut self,
        user: AccountId,
        amount: Amount,
        now: u64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        self.check_not_paused()?;
        ensure_positive(amount)?;

        let (mut next, interest) = self.accrued(&user, now)?;
        next.collateral = next.collateral.checked_add(amount)?;
        let staged = self.ledger.stage(user, next, now)?;

        let mut emitted = interest_events(user, interest);
        emitted.push(VaultEvent::Deposited(Deposited { user, amount }));
        info!(user = %user, amount = %amount, collateral = %next.collateral, "collateral deposited");
        Ok(self.commit(staged, self.reserve, emitted))
    }

    pub fn withdraw(
        &mut self,
        user: AccountId,
        amount: Amount,
        now: u64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        self.check_not_paused()?;
        ensure_positive(amount)?;

        let (mut next, interest) = self.accrued(&user, now)?;
        if amount > next.collateral {
            return Err(VaultError::InsufficientBalance {
                requested: amount,
                available: next.collateral,
            });
        }
        next.collateral = next.collateral.checked_sub(amount)?;
        if next.has_debt() {
            let value = self.value_of(next.collateral)?;
            let limit = valuation::borrow_limit(value, &self.config)?;
            if next.debt > limit {
                return Err(VaultError::InsufficientCollateral {
                    debt: next.debt,
                    limit,
                });
            }
        }
        let staged = self.ledger.stage(user, next, now)?;

        let mut emitted = interest_events(user, interest);
        emitted.push(VaultEvent::Withdrawn(Withdrawn { user, amount }));
        info!(user = %user, amount = %amount, collateral = %next.collateral, "collateral withdrawn");
        Ok(self.commit(staged, self.reserve, emitted))
    }

    // ───────────────────────── Debt ─────────────────────────

    pub fn borrow(
        &mut self,
        user: AccountId,
        amount: Amount,
        now: u64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        self.check_not_paused()?;
        ensure_positive(amount)?;

        let (mut next, interest) = self.accrued(&user, now)?;
        let new_debt = next.debt.checked_add(amount)?;
        let limit = if next.collateral.is_zero() {
            Amount::ZERO
        } else {
            valuation::borrow_limit(self.value_of(next.collateral)?, &self.config)?
        };
        if new_debt > limit {
            return Err(VaultError::InsufficientCollateral {
                debt: new_debt,
                limit,
            });
        }
        if amount > self.reserve {
            return Err(VaultError::InsufficientLiquidity {
                requested: amount,
                available: self.reserve,
            });
        }
        next.debt = new_debt;
        let reserve = self.reserve.checked_sub(amount)?;
        let staged = self.ledger.stage(user, next, now)?;

        let mut emitted = interest_events(user, interest);
        emitted.push(VaultEvent::Borrowed(Borrowed { user, amount }));
        info!(user = %user, amount = %amount, debt = %next.debt, limit = %limit, "borrowed");
        Ok(self.commit(staged, reserve, emitted))
    }

    /// Repay up to `amount` of debt. Overpayment is capped at the debt;
    /// the emitted event carries the effective amount.
    pub fn repay(
        &mut self,
        user: AccountId,
        amount: Amount,
        now: u64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        ensure_positive(amount)?;

        let (mut next, interest) = self.accrued(&user, now)?;
        if !next.has_debt() {
            return Err(VaultError::NoDebt);
        }
        let repaid = amount.min(next.debt);
        next.debt = next.debt.checked_sub(repaid)?;
        let reserve = self.reserve.checked_add(repaid)?;
        let staged = self.ledger.stage(user, next, now)?;

        let mut emitted = interest_events(user, interest);
        emitted.push(VaultEvent::Repaid(Repaid {
            user,
            amount: repaid,
        }));
        info!(user = %user, amount = %repaid, debt = %next.debt, "repaid");
        Ok(self.commit(staged, reserve, emitted))
    }

    /// Fold pending interest into `user`'s debt. Unknown accounts accrue
    /// nothing and are not created.
    pub fn accrue_interest(&mut self, user: AccountId, now: u64) -> Result<Amount, VaultError> {
        if !self.ledger.contains(&user) {
            return Ok(Amount::ZERO);
        }
        let (next, interest) = self.accrued(&user, now)?;
        let staged = self.ledger.stage(user, next, now)?;
        debug!(user = %user, interest = %interest, debt = %next.debt, "interest accrued");
        self.commit(staged, self.reserve, interest_events(user, interest));
        Ok(interest)
    }

    // ───────────────────────── Liquidation ─────────────────────────

    /// Repay `debt_to_cover` of an unhealthy position's debt in exchange
    /// for its collateral equivalent plus the liquidation bonus.
    pub fn liquidate(
        &mut self,
        liquidator: AccountId,
        user: AccountId,
        debt_to_cover: Amount,
        now: u64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        self.check_not_paused()?;
        if liquidator == user && !self.config.allow_self_liquidation {
            return Err(VaultError::SelfLiquidation);
        }

        let (mut next, interest) = self.accrued(&user, now)?;
        if !next.has_debt() {
            return Err(VaultError::NotLiquidatable {
                health_factor: HEALTH_FACTOR_MAX,
            });
        }
        let price = self.collateral_price()?;
        let value = valuation::collateral_value(next.collateral, price, &self.config)?;
        let health_factor = valuation::health_factor(value, next.debt, &self.config)?;
        if !valuation::is_liquidatable(health_factor, &self.config) {
            return Err(VaultError::NotLiquidatable { health_factor });
        }

        let plan = liquidation::plan_liquidation(&next, debt_to_cover, price, &self.config)?;
        next.debt = next.debt.checked_sub(plan.debt_repaid)?;
        next.collateral = next.collateral.checked_sub(plan.collateral_seized)?;
        let reserve = self.reserve.checked_add(plan.debt_repaid)?;
        let staged = self.ledger.stage(user, next, now)?;

        if !plan.shortfall.is_zero() {
            warn!(
                user = %user,
                liquidator = %liquidator,
                shortfall = %plan.shortfall,
                "seizure capped at remaining collateral"
            );
        }
        info!(
            user = %user,
            liquidator = %liquidator,
            health_factor,
            debt_repaid = %plan.debt_repaid,
            collateral_seized = %plan.collateral_seized,
            "position liquidated"
        );

        let mut emitted = interest_events(user, interest);
        emitted.push(VaultEvent::Liquidated(Liquidated {
            user,
            liquidator,
            debt_repaid: plan.debt_repaid,
            collateral_seized: plan.collateral_seized,
        }));
        Ok(self.commit(staged, reserve, emitted))
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Stored position, without pending interest.
    pub fn position(&self, user: &AccountId) -> Position {
        self.ledger.get(user)
    }

    pub fn get_position(&self, user: &AccountId, now: u64) -> Result<PositionView, VaultError> {
        let position = self.preview(user, now)?;
        Ok(PositionView {
            collateral: position.collateral,
            debt: position.debt,
            health_factor: self.health_of(&position)?,
        })
    }

    pub fn get_collateral_value(&self, user: &AccountId) -> Result<Amount, VaultError> {
        self.value_of(self.ledger.get(user).collateral)
    }

    /// Interest pending since the position's last update.
    pub fn get_accrued_interest(&self, user: &AccountId, now: u64) -> Result<Amount, VaultError> {
        accrual::pending_interest(&self.ledger.get(user), &self.config, now)
    }

    /// Debt principal plus pending interest.
    pub fn get_total_debt(&self, user: &AccountId, now: u64) -> Result<Amount, VaultError> {
        Ok(self.preview(user, now)?.debt)
    }

    pub fn get_user_health_factor(&self, user: &AccountId, now: u64) -> Result<u128, VaultError> {
        self.health_of(&self.preview(user, now)?)
    }

    pub fn is_liquidatable(&self, user: &AccountId, now: u64) -> Result<bool, VaultError> {
        let health_factor = self.get_user_health_factor(user, now)?;
        Ok(valuation::is_liquidatable(health_factor, &self.config))
    }

    pub fn get_collateralization_ratio(
        &self,
        user: &AccountId,
        now: u64,
    ) -> Result<u128, VaultError> {
        let position = self.preview(user, now)?;
        if !position.has_debt() {
            return Ok(HEALTH_FACTOR_MAX);
        }
        let value = self.value_of(position.collateral)?;
        Ok(valuation::collateralization_ratio(
            value,
            position.debt,
            &self.config,
        )?)
    }

    /// Additional debt `user` could borrow right now, ignoring reserve depth.
    pub fn get_max_borrow_amount(&self, user: &AccountId, now: u64) -> Result<Amount, VaultError> {
        let position = self.preview(user, now)?;
        let value = self.value_of(position.collateral)?;
        Ok(valuation::max_borrow(value, position.debt, &self.config)?)
    }

    pub fn get_max_withdraw_amount(
        &self,
        user: &AccountId,
        now: u64,
    ) -> Result<Amount, VaultError> {
        let position = self.preview(user, now)?;
        if !position.has_debt() {
            return Ok(position.collateral);
        }
        let price = self.collateral_price()?;
        Ok(valuation::max_withdraw(
            position.collateral,
            position.debt,
            price,
            &self.config,
        )?)
    }

    /// Largest `debt_to_cover` a liquidator can repay without the seizure
    /// being capped. Zero for positions that are not liquidatable.
    pub fn get_max_liquidatable_debt(
        &self,
        user: &AccountId,
        now: u64,
    ) -> Result<Amount, VaultError> {
        let position = self.preview(user, now)?;
        if !position.has_debt() {
            return Ok(Amount::ZERO);
        }
        let value = self.value_of(position.collateral)?;
        let health_factor = valuation::health_factor(value, position.debt, &self.config)?;
        if !valuation::is_liquidatable(health_factor, &self.config) {
            return Ok(Amount::ZERO);
        }
        Ok(liquidation::max_liquidatable_debt(
            position.debt,
            value,
            &self.config,
        )?)
    }

    pub fn totals(&self) -> SystemTotals {
        self.ledger.totals()
    }

    pub fn reserve(&self) -> Amount {
        self.reserve
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Every account with a stored position, in id order.
    pub fn accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self.ledger.accounts().copied().collect();
        accounts.sort();
        accounts
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Current collateral price from the oracle.
    pub fn collateral_price(&self) -> Result<Price, VaultError> {
        let price = self.oracle.price_of(&self.config.collateral_asset)?;
        if price.is_zero() {
            return Err(OracleError::InvalidPrice {
                asset: self.config.collateral_asset.to_string(),
                price: 0,
            }
            .into());
        }
        Ok(price)
    }

    pub fn consecutive_report_failures(&self) -> u32 {
        self.reporter.consecutive_failures()
    }

    // ───────────────────────── Admin ─────────────────────────

    /// Halt deposit, withdraw, borrow and liquidate. Owner-only.
    pub fn pause(&mut self, caller: AccountId) -> Result<VaultEvent, VaultError> {
        self.check_owner(&caller)?;
        if !self.pause_guard.pause() {
            return Err(VaultError::Paused);
        }
        warn!(caller = %caller, "vault paused");
        Ok(self.record(VaultEvent::Paused(Paused { account: caller })))
    }

    pub fn unpause(&mut self, caller: AccountId) -> Result<VaultEvent, VaultError> {
        self.check_owner(&caller)?;
        if !self.pause_guard.unpause() {
            return Err(VaultError::NotPaused);
        }
        info!(caller = %caller, "vault unpaused");
        Ok(self.record(VaultEvent::Unpaused(Unpaused { account: caller })))
    }

    pub fn is_paused(&self) -> bool {
        self.pause_guard.is_paused()
    }

    pub fn owner(&self) -> Option<AccountId> {
        self.ownable.owner()
    }

    pub fn transfer_ownership(
        &mut self,
        caller: AccountId,
        new_owner: AccountId,
    ) -> Result<VaultEvent, VaultError> {
        let previous = self
            .ownable
            .transfer(&caller, new_owner)
            .ok_or(VaultError::Unauthorized)?;
        info!(previous_owner = %previous, new_owner = %new_owner, "ownership transferred");
        Ok(self.record(VaultEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: Some(previous),
            new_owner: Some(new_owner),
        })))
    }

    /// Leave the vault without an owner. Pause state is frozen from then on.
    pub fn renounce_ownership(&mut self, caller: AccountId) -> Result<VaultEvent, VaultError> {
        if !self.ownable.renounce(&caller) {
            return Err(VaultError::Unauthorized);
        }
        warn!(previous_owner = %caller, "ownership renounced");
        Ok(self.record(VaultEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: Some(caller),
            new_owner: None,
        })))
    }

    pub fn update_price_oracle(
        &mut self,
        caller: AccountId,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<(), VaultError> {
        self.check_owner(&caller)?;
        self.oracle = oracle;
        info!(caller = %caller, "price oracle updated");
        Ok(())
    }

    pub fn update_state_aggregator(
        &mut self,
        caller: AccountId,
        aggregator: Arc<dyn StateAggregator>,
    ) -> Result<(), VaultError> {
        self.check_owner(&caller)?;
        self.reporter.set_sink(aggregator);
        info!(caller = %caller, "state aggregator updated");
        Ok(())
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn check_not_paused(&self) -> Result<(), VaultError> {
        if self.pause_guard.is_paused() {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    fn check_owner(&self, caller: &AccountId) -> Result<(), VaultError> {
        if !self.ownable.is_owner(caller) {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }

    /// Accrued copy of `user`'s position for a mutation at `now`.
    fn accrued(&self, user: &AccountId, now: u64) -> Result<(Position, Amount), VaultError> {
        let last = self.ledger.totals().last_interest_update;
        if now < last {
            return Err(VaultError::ClockSkew {
                now,
                last_update: last,
            });
        }
        accrual::accrue(&self.ledger.get(user), &self.config, now)
    }

    fn preview(&self, user: &AccountId, now: u64) -> Result<Position, VaultError> {
        accrual::accrue(&self.ledger.get(user), &self.config, now).map(|(position, _)| position)
    }

    fn value_of(&self, collateral: Amount) -> Result<Amount, VaultError> {
        if collateral.is_zero() {
            return Ok(Amount::ZERO);
        }
        let price = self.collateral_price()?;
        Ok(valuation::collateral_value(collateral, price, &self.config)?)
    }

    fn health_of(&self, position: &Position) -> Result<u128, VaultError> {
        if !position.has_debt() {
            return Ok(HEALTH_FACTOR_MAX);
        }
        let value = self.value_of(position.collateral)?;
        Ok(valuation::health_factor(value, position.debt, &self.config)?)
    }

    fn record(&mut self, event: VaultEvent) -> VaultEvent {
        self.events.push(event.clone());
        event
    }

    fn commit(
        &mut self,
        staged: StagedEntry,
        reserve: Amount,
        emitted: Vec<VaultEvent>,
    ) -> Vec<VaultEvent> {
        self.ledger.commit(staged);
        self.reserve = reserve;
        self.events.extend(emitted.iter().cloned());
        let totals = self.ledger.totals();
        self.reporter.report(&totals);
        emitted
    }
}

fn ensure_positive(amount: Amount) -> Result<(), VaultError> {
    if amount.is_zero() {
        return Err(VaultError::InvalidAmount { amount });
    }
    Ok(())
}

fn interest_events(user: AccountId, interest: Amount) -> Vec<VaultEvent> {
    if interest.is_zero() {
        Vec::new()
    } else {
        vec![VaultEvent::InterestAccrued(InterestAccrued {
            user,
            amount: interest,
        })]
    }
}
