//! Simple interest accrual
//!
//! `interest = floor(debt * rate * elapsed / (seconds_per_year * precision))`
//!
//! Accruing folds the interest into the principal and moves `last_update`
//! to `now`, so repeated accruals compound slightly relative to a single
//! accrual over the same span.

use crate::config::VaultConfig;
use crate::errors::VaultError;
use types::errors::MathError;
use types::numeric::Amount;
use types::position::Position;

/// Interest owed on `position` since its last update, without applying it.
pub fn pending_interest(
    position: &Position,
    config: &VaultConfig,
    now: u64,
) -> Result<Amount, VaultError> {
    if now < position.last_update {
        return Err(VaultError::ClockSkew {
            now,
            last_update: position.last_update,
        });
    }
    let elapsed = now - position.last_update;
    if elapsed == 0 || position.debt.is_zero() || config.interest_rate == 0 {
        return Ok(Amount::ZERO);
    }

    let rate_time = config
        .interest_rate
        .checked_mul(elapsed as u128)
        .ok_or(MathError::Overflow)?;
    let denom = (config.seconds_per_year as u128)
        .checked_mul(config.precision)
        .ok_or(MathError::Overflow)?;
    Ok(position.debt.mul_div_floor(rate_time, denom)?)
}

/// Return `position` with pending interest folded into its debt and
/// `last_update` set to `now`, along with the interest amount.
pub fn accrue(
    position: &Position,
    config: &VaultConfig,
    now: u64,
) -> Result<(Position, Amount), VaultError> {
    let interest = pending_interest(position, config, now)?;
    let mut next = *position;
    next.debt = next.debt.checked_add(interest)?;
    next.last_update = now;
    Ok((next, interest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: u64 = 31_536_000;

    fn debt_position(debt: u128, last_update: u64) -> Position {
        Position::new(Amount::new(1), Amount::new(debt), last_update)
    }

    #[test]
    fn test_one_year_at_three_percent() {
        let config = VaultConfig::default();
        let position = debt_position(1_000, 0);
        let interest = pending_interest(&position, &config, YEAR).unwrap();
        assert_eq!(interest, Amount::new(30));
    }

    #[test]
    fn test_half_year_floors() {
        let config = VaultConfig::default();
        // 100 * 3 * 0.5 / 100 = 1.5 -> 1
        let position = debt_position(100, 0);
        let interest = pending_interest(&position, &config, YEAR / 2).unwrap();
        assert_eq!(interest, Amount::new(1));
    }

    #[test]
    fn test_zero_elapsed_or_zero_debt() {
        let config = VaultConfig::default();
        assert_eq!(
            pending_interest(&debt_position(1_000, 50), &config, 50),
            Ok(Amount::ZERO)
        );
        assert_eq!(
            pending_interest(&debt_position(0, 0), &config, YEAR),
            Ok(Amount::ZERO)
        );
    }

    #[test]
    fn test_clock_skew() {
        let config = VaultConfig::default();
        let err = pending_interest(&debt_position(1_000, 100), &config, 99).unwrap_err();
        assert_eq!(
            err,
            VaultError::ClockSkew {
                now: 99,
                last_update: 100
            }
        );
    }

    #[test]
    fn test_accrue_folds_interest() {
        let config = VaultConfig::default();
        let (next, interest) = accrue(&debt_position(1_000, 0), &config, YEAR).unwrap();
        assert_eq!(interest, Amount::new(30));
        assert_eq!(next.debt, Amount::new(1_030));
        assert_eq!(next.last_update, YEAR);
        assert_eq!(next.collateral, Amount::new(1));
    }

    #[test]
    fn test_accrue_moves_timestamp_without_debt() {
        let config = VaultConfig::default();
        let (next, interest) = accrue(&debt_position(0, 10), &config, 20).unwrap();
        assert!(interest.is_zero());
        assert_eq!(next.last_update, 20);
    }

    #[test]
    fn test_large_debt_does_not_overflow() {
        let config = VaultConfig::default();
        // 1e30 base units of debt over ten years
        let position = debt_position(1_000_000_000_000_000_000_000_000_000_000, 0);
        let interest = pending_interest(&position, &config, YEAR * 10).unwrap();
        assert_eq!(interest, Amount::new(300_000_000_000_000_000_000_000_000_000));
    }
}
