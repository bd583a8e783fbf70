//! Liquidation Monitor Service
//!
//! Watches a shared vault for unhealthy positions:
//! - Health banding (healthy / warning / danger / liquidatable)
//! - Risk events for alerting and liquidation bots
//! - Candidate sizing and batch liquidation
//! - Periodic scan loop on tokio

pub mod engine;
pub mod errors;
pub mod events;
pub mod handle;
pub mod health;
pub mod service;
