//! Vault position record
//!
//! One record per account: collateral held, debt principal (excluding
//! interest accrued since `last_update`), and the accrual timestamp.

use crate::numeric::Amount;
use serde::{Deserialize, Serialize};

/// Per-account collateral/debt record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Collateral token held on behalf of the account
    pub collateral: Amount,
    /// Debt principal, excluding interest accrued since `last_update`
    pub debt: Amount,
    /// Seconds timestamp of the last accrual or balance mutation
    pub last_update: u64,
}

impl Position {
    pub fn new(collateral: Amount, debt: Amount, last_update: u64) -> Self {
        Self {
            collateral,
            debt,
            last_update,
        }
    }

    /// A position with neither collateral nor debt carries no economic weight
    /// and does not count towards the active position total.
    pub fn is_inert(&self) -> bool {
        self.collateral.is_zero() && self.debt.is_zero()
    }

    pub fn has_debt(&self) -> bool {
        !self.debt.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_is_inert() {
        let position = Position::default();
        assert!(position.is_inert());
        assert!(!position.has_debt());
        assert_eq!(position.last_update, 0);
    }

    #[test]
    fn test_collateral_only_is_active() {
        let position = Position::new(Amount::new(10), Amount::ZERO, 1_700_000_000);
        assert!(!position.is_inert());
        assert!(!position.has_debt());
    }

    #[test]
    fn test_debt_only_is_active() {
        let position = Position::new(Amount::ZERO, Amount::new(1), 1_700_000_000);
        assert!(!position.is_inert());
        assert!(position.has_debt());
    }

    #[test]
    fn test_position_serialization() {
        let position = Position::new(Amount::new(10), Amount::new(5), 42);
        let json = serde_json::to_string(&position).unwrap();
        assert_eq!(
            json,
            r#"{"collateral":"10","debt":"5","last_update":42}"#
        );
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, position);
    }
}
