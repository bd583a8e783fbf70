//! Risk event definitions
//!
//! Events emitted by the monitor for alerting and for liquidation bots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::Amount;
use uuid::Uuid;

use crate::health::HealthLevel;

/// Risk event emitted by the liquidation monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub event_id: Uuid,
    pub account_id: Option<AccountId>,
    pub event_type: RiskEventType,
    /// `None` when the ratio does not fit a Decimal (no debt)
    pub health_ratio: Option<Decimal>,
    pub collateral: Amount,
    pub debt: Amount,
    pub timestamp: i64,
}

/// Risk event type classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskEventType {
    /// Health factor inside the warning band
    HealthWarning,
    /// Health factor inside the danger band
    HealthDanger,
    /// Health factor below the threshold, open to liquidation
    LiquidationCandidate { max_debt_to_cover: Amount },
    /// A scan could not complete
    ScanFailed { reason: String },
}

impl RiskEvent {
    pub fn new(
        account_id: Option<AccountId>,
        event_type: RiskEventType,
        health_ratio: Option<Decimal>,
        collateral: Amount,
        debt: Amount,
        timestamp: i64,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            account_id,
            event_type,
            health_ratio,
            collateral,
            debt,
            timestamp,
        }
    }
}

/// Generate risk events for a position's health level.
pub fn events_for_health(
    account_id: AccountId,
    health: HealthLevel,
    health_ratio: Option<Decimal>,
    collateral: Amount,
    debt: Amount,
    max_debt_to_cover: Amount,
    timestamp: i64,
) -> Vec<RiskEvent> {
    let event_type = match health {
        HealthLevel::Healthy => return Vec::new(),
        HealthLevel::Warning => RiskEventType::HealthWarning,
        HealthLevel::Danger => RiskEventType::HealthDanger,
        HealthLevel::Liquidatable => RiskEventType::LiquidationCandidate { max_debt_to_cover },
    };
    vec![RiskEvent::new(
        Some(account_id),
        event_type,
        health_ratio,
        collateral,
        debt,
        timestamp,
    )]
}

pub fn scan_failed_event(reason: String, timestamp: i64) -> RiskEvent {
    RiskEvent::new(
        None,
        RiskEventType::ScanFailed { reason },
        None,
        Amount::ZERO,
        Amount::ZERO,
        timestamp,
    )
}
