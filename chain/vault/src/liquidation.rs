//! Liquidation sizing
//!
//! The liquidator repays `debt_to_cover` of the borrower's debt and receives
//! its collateral equivalent plus the bonus:
//!
//! ```text
//! base   = floor(debt_to_cover * price_precision / price)
//! seized = floor(base * (precision + bonus) / precision)
//! ```
//!
//! When `seized` exceeds the borrower's collateral the [`SeizurePolicy`]
//! decides between capping and rejecting.

use crate::config::{SeizurePolicy, VaultConfig};
use crate::errors::VaultError;
use serde::{Deserialize, Serialize};
use types::errors::MathError;
use types::numeric::{Amount, Price};
use types::position::Position;

/// Outcome of sizing a liquidation against an accrued position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPlan {
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
    /// Collateral the liquidator was owed but did not receive due to capping
    pub shortfall: Amount,
}

/// Size a liquidation. `position` must already include accrued interest.
pub fn plan_liquidation(
    position: &Position,
    debt_to_cover: Amount,
    price: Price,
    config: &VaultConfig,
) -> Result<LiquidationPlan, VaultError> {
    if debt_to_cover.is_zero() || debt_to_cover > position.debt {
        return Err(VaultError::InvalidAmount {
            amount: debt_to_cover,
        });
    }
    let owed = seizure_for(debt_to_cover, price, config)?;

    if owed <= position.collateral {
        return Ok(LiquidationPlan {
            debt_repaid: debt_to_cover,
            collateral_seized: owed,
            shortfall: Amount::ZERO,
        });
    }
    match config.seizure_policy {
        SeizurePolicy::CapToCollateral => Ok(LiquidationPlan {
            debt_repaid: debt_to_cover,
            collateral_seized: position.collateral,
            shortfall: owed.checked_sub(position.collateral)?,
        }),
        SeizurePolicy::Reject => Err(VaultError::InsufficientBalance {
            requested: owed,
            available: position.collateral,
        }),
    }
}

/// Collateral owed for repaying `debt`, bonus included.
pub fn seizure_for(debt: Amount, price: Price, config: &VaultConfig) -> Result<Amount, MathError> {
    let base = debt.mul_div_floor(config.price_precision, price.raw())?;
    let bonus_factor = config
        .precision
        .checked_add(config.liquidation_bonus)
        .ok_or(MathError::Overflow)?;
    base.mul_div_floor(bonus_factor, config.precision)
}

/// Largest `debt_to_cover` whose seizure, bonus included, fits within the
/// collateral worth `value`. Never exceeds the debt itself.
pub fn max_liquidatable_debt(
    debt: Amount,
    value: Amount,
    config: &VaultConfig,
) -> Result<Amount, MathError> {
    let bonus_factor = config
        .precision
        .checked_add(config.liquidation_bonus)
        .ok_or(MathError::Overflow)?;
    let covered = value.mul_div_floor(config.precision, bonus_factor)?;
    Ok(debt.min(covered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::collateral_value;
    use proptest::prelude::*;

    fn usd(whole: u128) -> Price {
        Price::from_units(whole, 100_000_000).unwrap()
    }

    fn position(collateral: u128, debt: u128) -> Position {
        Position::new(Amount::new(collateral), Amount::new(debt), 0)
    }

    #[test]
    fn test_seizure_with_bonus() {
        let config = VaultConfig::default();
        let plan = plan_liquidation(&position(1140, 1000), Amount::new(500), usd(1), &config)
            .unwrap();
        assert_eq!(plan.debt_repaid, Amount::new(500));
        assert_eq!(plan.collateral_seized, Amount::new(550));
        assert!(plan.shortfall.is_zero());
    }

    #[test]
    fn test_seizure_floors() {
        let config = VaultConfig::default();
        // 7 debt at $2 -> base 3 -> 3 * 110 / 100 = 3
        assert_eq!(seizure_for(Amount::new(7), usd(2), &config), Ok(Amount::new(3)));
    }

    #[test]
    fn test_zero_cover_rejected() {
        let config = VaultConfig::default();
        let err = plan_liquidation(&position(100, 100), Amount::ZERO, usd(1), &config)
            .unwrap_err();
        assert_eq!(err, VaultError::InvalidAmount { amount: Amount::ZERO });
    }

    #[test]
    fn test_cover_above_debt_rejected() {
        let config = VaultConfig::default();
        let err = plan_liquidation(&position(100, 100), Amount::new(101), usd(1), &config)
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidAmount { .. }));
    }

    #[test]
    fn test_cap_to_collateral() {
        let config = VaultConfig::default();
        // Underwater: 100 collateral at $1 against 100 debt
        let plan = plan_liquidation(&position(100, 100), Amount::new(100), usd(1), &config)
            .unwrap();
        assert_eq!(plan.collateral_seized, Amount::new(100));
        assert_eq!(plan.shortfall, Amount::new(10));
    }

    #[test]
    fn test_reject_policy() {
        let config = VaultConfig {
            seizure_policy: SeizurePolicy::Reject,
            ..Default::default()
        };
        let err = plan_liquidation(&position(100, 100), Amount::new(100), usd(1), &config)
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::InsufficientBalance {
                requested: Amount::new(110),
                available: Amount::new(100)
            }
        );
    }

    #[test]
    fn test_max_liquidatable_debt() {
        let config = VaultConfig::default();
        // value 1140 covers floor(1140 * 100 / 110) = 1036 of debt
        assert_eq!(
            max_liquidatable_debt(Amount::new(1000), Amount::new(1140), &config),
            Ok(Amount::new(1000))
        );
        assert_eq!(
            max_liquidatable_debt(Amount::new(1000), Amount::new(990), &config),
            Ok(Amount::new(900))
        );
    }

    proptest! {
        /// Covering the max liquidatable debt never seizes more collateral
        /// than the position holds.
        #[test]
        fn prop_max_liquidatable_fits_collateral(
            collateral in 1u128..=1_000_000_000_000_000u128,
            debt in 1u128..=1_000_000_000_000_000u128,
            price in 1u128..=100_000_000_000_000u128,
        ) {
            let config = VaultConfig::default();
            let price = Price::new(price);
            let collateral = Amount::new(collateral);
            let value = collateral_value(collateral, price, &config).unwrap();
            let cover = max_liquidatable_debt(Amount::new(debt), value, &config).unwrap();
            let seized = seizure_for(cover, price, &config).unwrap();
            prop_assert!(seized <= collateral);
        }
    }
}
