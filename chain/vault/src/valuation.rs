//! Collateral valuation and health checks
//!
//! All functions are pure and take amounts already reflecting accrued
//! interest. Quantities:
//!
//! - value: `floor(collateral * price / price_precision)`
//! - collateralization ratio: `floor(value * precision / debt)`
//! - health factor: `floor(ratio * precision / liquidation_threshold)`
//! - borrow limit: `floor(value * precision / collateral_ratio)`
//!
//! A health factor below `precision` means the position is liquidatable.
//! Because `floor(floor(x) / n) == floor(x / n)`, that test is exactly
//! `value * precision < liquidation_threshold * debt`.

use crate::config::VaultConfig;
use types::errors::MathError;
use types::numeric::{mul_div_ceil, mul_div_floor, Amount, Price};

/// Health factor and ratio reported for positions without debt
pub const HEALTH_FACTOR_MAX: u128 = u128::MAX;

/// Ratios too large for `u128` are reported as the maximum.
fn saturate(result: Result<u128, MathError>) -> Result<u128, MathError> {
    match result {
        Err(MathError::Overflow) => Ok(u128::MAX),
        other => other,
    }
}

/// USD value of `collateral` at `price`.
pub fn collateral_value(
    collateral: Amount,
    price: Price,
    config: &VaultConfig,
) -> Result<Amount, MathError> {
    collateral.mul_div_floor(price.raw(), config.price_precision)
}

/// Maximum total debt supported by `value` at the collateral ratio.
pub fn borrow_limit(value: Amount, config: &VaultConfig) -> Result<Amount, MathError> {
    value.mul_div_floor(config.precision, config.collateral_ratio)
}

pub fn collateralization_ratio(
    value: Amount,
    debt: Amount,
    config: &VaultConfig,
) -> Result<u128, MathError> {
    if debt.is_zero() {
        return Ok(HEALTH_FACTOR_MAX);
    }
    saturate(mul_div_floor(value.raw(), config.precision, debt.raw()))
}

pub fn health_factor(
    value: Amount,
    debt: Amount,
    config: &VaultConfig,
) -> Result<u128, MathError> {
    if debt.is_zero() {
        return Ok(HEALTH_FACTOR_MAX);
    }
    let ratio = collateralization_ratio(value, debt, config)?;
    saturate(mul_div_floor(
        ratio,
        config.precision,
        config.liquidation_threshold,
    ))
}

pub fn is_liquidatable(health_factor: u128, config: &VaultConfig) -> bool {
    health_factor < config.precision
}

/// Additional debt that can be drawn against `value`.
pub fn max_borrow(
    value: Amount,
    total_debt: Amount,
    config: &VaultConfig,
) -> Result<Amount, MathError> {
    Ok(borrow_limit(value, config)?.saturating_sub(total_debt))
}

/// Smallest collateral whose borrow limit still covers `debt`.
pub fn min_collateral_for_debt(
    debt: Amount,
    price: Price,
    config: &VaultConfig,
) -> Result<Amount, MathError> {
    if debt.is_zero() {
        return Ok(Amount::ZERO);
    }
    let required_value = debt.mul_div_ceil(config.collateral_ratio, config.precision)?;
    mul_div_ceil(required_value.raw(), config.price_precision, price.raw()).map(Amount::new)
}

/// Collateral that can leave the position without breaching the collateral
/// ratio. Withdrawing one unit more fails the ratio check.
pub fn max_withdraw(
    collateral: Amount,
    total_debt: Amount,
    price: Price,
    config: &VaultConfig,
) -> Result<Amount, MathError> {
    if total_debt.is_zero() {
        return Ok(collateral);
    }
    let floor = min_collateral_for_debt(total_debt, price, config)?;
    Ok(collateral.saturating_sub(floor))
}
