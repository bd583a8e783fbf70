//! Price oracle interface
//!
//! The vault asks for the collateral price on every valuation; nothing is
//! cached across calls.

use crate::errors::OracleError;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use types::ids::AssetId;
use types::numeric::Price;

/// Source of asset prices, scaled by the vault's `price_precision`.
pub trait PriceOracle: Send + Sync + fmt::Debug {
    fn price_of(&self, asset: &AssetId) -> Result<Price, OracleError>;
}

/// In-memory oracle with operator-set prices.
///
/// Used by the simulator and tests; prices change only through `set_price`.
#[derive(Debug, Default)]
pub struct StaticPriceOracle {
    prices: RwLock<HashMap<AssetId, Price>>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(asset: AssetId, price: Price) -> Self {
        let oracle = Self::new();
        oracle.set_price(asset, price);
        oracle
    }

    pub fn set_price(&self, asset: AssetId, price: Price) {
        if let Ok(mut prices) = self.prices.write() {
            prices.insert(asset, price);
        }
    }

    pub fn remove_price(&self, asset: &AssetId) -> Option<Price> {
        self.prices.write().ok()?.remove(asset)
    }
}

impl PriceOracle for StaticPriceOracle {
    fn price_of(&self, asset: &AssetId) -> Result<Price, OracleError> {
        let prices = self.prices.read().map_err(|_| OracleError::Unreachable {
            reason: "price table lock poisoned".to_string(),
        })?;
        prices
            .get(asset)
            .copied()
            .ok_or_else(|| OracleError::PriceUnavailable {
                asset: asset.to_string(),
            })
    }
}
