//! Types library for the collateralized lending vault
//!
//! Core type definitions shared by the vault state machine, the
//! liquidation monitor and the simulator.
//!
//! # Modules
//! - `ids`: Identifiers (AccountId, AssetId)
//! - `numeric`: Fixed-point integer types (Amount, Price) and mul-div helpers
//! - `position`: Per-account collateral/debt record
//! - `errors`: Arithmetic error taxonomy

pub mod ids;
pub mod numeric;
pub mod position;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::position::*;
    pub use crate::errors::*;
}
