//! Health banding
//!
//! Converts the vault's integer health factor into a Decimal ratio
//! (1.0 = liquidation threshold) and classifies it into bands. The
//! liquidatable band is decided by the vault's exact integer test, never
//! by the Decimal view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── Health levels ────────────────────────────────────────────────────────

/// Position health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthLevel {
    /// Below the liquidation threshold, open to liquidation
    Liquidatable,
    /// Above the threshold but inside the danger band
    Danger,
    /// Inside the warning band
    Warning,
    /// No debt, or comfortably collateralized
    Healthy,
}

/// Decimal band boundaries, in health factor units (1.0 = threshold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBands {
    pub warning: Decimal,
    pub danger: Decimal,
}

impl Default for HealthBands {
    fn default() -> Self {
        Self {
            warning: Decimal::new(15, 1),
            danger: Decimal::new(11, 1),
        }
    }
}

/// Health factor as a Decimal ratio. `None` when the factor does not fit,
/// which only happens for debt-free or vastly overcollateralized positions.
pub fn health_ratio(health_factor: u128, precision: u128) -> Option<Decimal> {
    let raw = i128::try_from(health_factor).ok()?;
    let numerator = Decimal::try_from_i128_with_scale(raw, 0).ok()?;
    let denominator = Decimal::try_from_i128_with_scale(i128::try_from(precision).ok()?, 0).ok()?;
    numerator.checked_div(denominator)
}

/// Classify a position given the vault's liquidatable verdict and its ratio.
pub fn health_status(liquidatable: bool, ratio: Option<Decimal>, bands: &HealthBands) -> HealthLevel {
    if liquidatable {
        return HealthLevel::Liquidatable;
    }
    match ratio {
        Some(r) if r < bands.danger => HealthLevel::Danger,
        Some(r) if r < bands.warning => HealthLevel::Warning,
        _ => HealthLevel::Healthy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_ratio() {
        assert_eq!(health_ratio(95, 100), Some(Decimal::new(95, 2)));
        assert_eq!(health_ratio(166, 100), Some(Decimal::new(166, 2)));
        assert_eq!(health_ratio(u128::MAX, 100), None);
    }

    #[test]
    fn test_health_status_bands() {
        let bands = HealthBands::default();
        let level = |hf: u128| health_status(hf < 100, health_ratio(hf, 100), &bands);

        assert_eq!(level(95), HealthLevel::Liquidatable);
        assert_eq!(level(100), HealthLevel::Danger);
        assert_eq!(level(109), HealthLevel::Danger);
        assert_eq!(level(110), HealthLevel::Warning);
        assert_eq!(level(149), HealthLevel::Warning);
        assert_eq!(level(150), HealthLevel::Healthy);
        assert_eq!(level(u128::MAX), HealthLevel::Healthy);
    }

    #[test]
    fn test_levels_order_by_severity() {
        assert!(HealthLevel::Liquidatable < HealthLevel::Danger);
        assert!(HealthLevel::Danger < HealthLevel::Warning);
        assert!(HealthLevel::Warning < HealthLevel::Healthy);
    }
}
