//! Simulation & stress testing for the lending vault
//!
//! Provides:
//! - Deterministic vault harness with a seeded RNG and manual clock
//! - Liquidation cascade and interest drift scenarios
//! - Flow metrics folded from the vault event stream
//! - JSON export of scenario results

pub mod engine;
pub mod export;
pub mod metrics;
pub mod scenarios;

pub const VERSION: &str = "1.0.0";
