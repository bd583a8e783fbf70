//! Monitor error types

use thiserror::Error;
use vault::errors::VaultError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Vault lock poisoned")]
    LockPoisoned,

    #[error("Event channel closed")]
    ChannelClosed,
}
