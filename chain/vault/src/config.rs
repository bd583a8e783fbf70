//! Vault configuration
//!
//! All ratios are integers scaled by `precision` (150 means 150% at the
//! default precision of 100). Prices are scaled by `price_precision`.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::warn;
use types::ids::AssetId;

/// What to do when collateral plus bonus exceeds the borrower's collateral
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeizurePolicy {
    /// Seize whatever collateral remains; the liquidator forgoes the shortfall
    #[default]
    CapToCollateral,
    /// Fail the liquidation
    Reject,
}

/// Vault-wide parameters, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub collateral_asset: AssetId,
    pub debt_asset: AssetId,
    /// Minimum collateral value over debt required to borrow or withdraw
    pub collateral_ratio: u128,
    /// Ratio below which a position becomes liquidatable
    pub liquidation_threshold: u128,
    /// Extra collateral paid to the liquidator, on top of the repaid value
    pub liquidation_bonus: u128,
    /// Simple annual interest rate
    pub interest_rate: u128,
    pub precision: u128,
    pub price_precision: u128,
    pub seconds_per_year: u64,
    pub allow_self_liquidation: bool,
    pub seizure_policy: SeizurePolicy,
    /// Consecutive aggregator failures before the reporter escalates to error
    pub report_failure_alert_threshold: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            collateral_asset: AssetId::new("WETH"),
            debt_asset: AssetId::new("LUSD"),
            collateral_ratio: 150,
            liquidation_threshold: 120,
            liquidation_bonus: 10,
            interest_rate: 3,
            precision: 100,
            price_precision: 100_000_000,
            seconds_per_year: 31_536_000,
            allow_self_liquidation: true,
            seizure_policy: SeizurePolicy::CapToCollateral,
            report_failure_alert_threshold: 3,
        }
    }
}

impl VaultConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("collateral_ratio", self.collateral_ratio),
            ("liquidation_threshold", self.liquidation_threshold),
            ("precision", self.precision),
            ("price_precision", self.price_precision),
            ("seconds_per_year", self.seconds_per_year as u128),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }
        if self.collateral_asset == self.debt_asset {
            return Err(ConfigError::SameAsset {
                asset: self.collateral_asset.to_string(),
            });
        }
        if self.liquidation_threshold > self.collateral_ratio {
            // Fresh borrows at the limit would be immediately liquidatable.
            warn!(
                liquidation_threshold = self.liquidation_threshold,
                collateral_ratio = self.collateral_ratio,
                "liquidation threshold exceeds collateral ratio"
            );
        }
        Ok(())
    }
}
