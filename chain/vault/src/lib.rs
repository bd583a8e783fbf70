//! Collateralized Lending Vault
//!
//! Borrowers lock a collateral token, draw a debt token against it at a
//! fixed collateral ratio, and accrue simple interest on the debt. Positions
//! whose health factor drops below one can be partially liquidated by third
//! parties for a bonus.
//!
//! # Modules
//! - `config`: Vault parameters and their validation
//! - `errors`: Vault, oracle, aggregator and config error types
//! - `events`: Events emitted by successful operations
//! - `security`: Owner access control and pause guard
//! - `ledger`: Per-account positions and system totals
//! - `accrual`: Simple interest accrual
//! - `valuation`: Collateral value, health factor, borrow/withdraw limits
//! - `liquidation`: Liquidation sizing and seizure policy
//! - `oracle`: Price oracle interface
//! - `reporter`: Best-effort totals reporting to a state aggregator
//! - `vault`: The vault orchestrator
//!
//! # Version
//! v0.1.0: initial implementation

pub mod accrual;
pub mod config;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod liquidation;
pub mod oracle;
pub mod reporter;
pub mod security;
pub mod valuation;
pub mod vault;

/// Vault ABI version, frozen after release
pub const VAULT_ABI_VERSION: &str = "1.0.0";

pub mod prelude {
    pub use crate::config::{SeizurePolicy, VaultConfig};
    pub use crate::errors::{AggregatorError, ConfigError, OracleError, VaultError};
    pub use crate::events::VaultEvent;
    pub use crate::ledger::{LedgerSnapshot, SystemTotals};
    pub use crate::oracle::{PriceOracle, StaticPriceOracle};
    pub use crate::reporter::{RecordingAggregator, StateAggregator, SystemStateUpdate};
    pub use crate::valuation::HEALTH_FACTOR_MAX;
    pub use crate::vault::{PositionView, Vault};
    pub use types::prelude::*;
}
