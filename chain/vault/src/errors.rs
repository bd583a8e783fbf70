//! Vault error types
//!
//! Every mutator either applies all of its effects or returns one of these
//! with the vault state untouched.

use thiserror::Error;
use types::errors::MathError;
use types::numeric::Amount;

/// Errors returned by vault operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Insufficient collateral: debt {debt} exceeds borrow limit {limit}")]
    InsufficientCollateral { debt: Amount, limit: Amount },

    #[error("Position not liquidatable: health factor {health_factor}")]
    NotLiquidatable { health_factor: u128 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Amount },

    #[error("No debt to repay")]
    NoDebt,

    #[error("Clock skew: now {now} is before last update {last_update}")]
    ClockSkew { now: u64, last_update: u64 },

    #[error("Insufficient liquidity: requested {requested}, reserve {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },

    #[error("Self-liquidation is disabled")]
    SelfLiquidation,

    #[error("Vault is paused")]
    Paused,

    #[error("Vault is not paused")]
    NotPaused,

    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Price oracle failures, surfaced unchanged to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("No price available for {asset}")]
    PriceUnavailable { asset: String },

    #[error("Invalid price for {asset}: {price}")]
    InvalidPrice { asset: String, price: u128 },

    #[error("Oracle unreachable: {reason}")]
    Unreachable { reason: String },
}

/// State aggregator failures; never roll back vault state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("State update rejected: {reason}")]
    Rejected { reason: String },

    #[error("Aggregator unreachable: {reason}")]
    Unreachable { reason: String },
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be non-zero")]
    ZeroValue { field: &'static str },

    #[error("Collateral and debt asset must differ: {asset}")]
    SameAsset { asset: String },

    #[error("Invalid config document: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_error_display() {
        let err = VaultError::InsufficientBalance {
            requested: Amount::new(11),
            available: Amount::new(10),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 11, available 10"
        );
    }

    #[test]
    fn test_clock_skew_display() {
        let err = VaultError::ClockSkew {
            now: 99,
            last_update: 100,
        };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_vault_error_from_oracle() {
        let oracle_err = OracleError::PriceUnavailable {
            asset: "WETH".to_string(),
        };
        let vault_err: VaultError = oracle_err.into();
        assert!(matches!(vault_err, VaultError::Oracle(_)));
    }

    #[test]
    fn test_vault_error_from_math() {
        let vault_err: VaultError = MathError::Overflow.into();
        assert_eq!(vault_err, VaultError::Math(MathError::Overflow));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ZeroValue { field: "precision" };
        assert_eq!(err.to_string(), "precision must be non-zero");
    }
}
