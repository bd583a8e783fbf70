//! Vault events
//!
//! Immutable records emitted by successful operations, in the order the
//! effects were applied. A failed operation emits nothing.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::Amount;

/// Collateral deposited into a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub user: AccountId,
    pub amount: Amount,
}

/// Collateral returned to the owner of a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub user: AccountId,
    pub amount: Amount,
}

/// Debt token lent out of the reserve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowed {
    pub user: AccountId,
    pub amount: Amount,
}

/// Debt repaid; `amount` is the effective amount after capping at the debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repaid {
    pub user: AccountId,
    pub amount: Amount,
}

/// Interest folded into the debt principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestAccrued {
    pub user: AccountId,
    pub amount: Amount,
}

/// Debt covered by a third party in exchange for collateral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidated {
    pub user: AccountId,
    pub liquidator: AccountId,
    pub debt_repaid: Amount,
    pub collateral_seized: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paused {
    pub account: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpaused {
    pub account: AccountId,
}

/// `new_owner` is `None` after renouncement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Option<AccountId>,
    pub new_owner: Option<AccountId>,
}

/// Enum wrapper for all vault events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VaultEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    Borrowed(Borrowed),
    Repaid(Repaid),
    InterestAccrued(InterestAccrued),
    Liquidated(Liquidated),
    Paused(Paused),
    Unpaused(Unpaused),
    OwnershipTransferred(OwnershipTransferred),
}

impl VaultEvent {
    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            VaultEvent::Deposited(_) => "deposited",
            VaultEvent::Withdrawn(_) => "withdrawn",
            VaultEvent::Borrowed(_) => "borrowed",
            VaultEvent::Repaid(_) => "repaid",
            VaultEvent::InterestAccrued(_) => "interest_accrued",
            VaultEvent::Liquidated(_) => "liquidated",
            VaultEvent::Paused(_) => "paused",
            VaultEvent::Unpaused(_) => "unpaused",
            VaultEvent::OwnershipTransferred(_) => "ownership_transferred",
        }
    }

    /// Account whose position the event touches, if any
    pub fn user(&self) -> Option<AccountId> {
        match self {
            VaultEvent::Deposited(e) => Some(e.user),
            VaultEvent::Withdrawn(e) => Some(e.user),
            VaultEvent::Borrowed(e) => Some(e.user),
            VaultEvent::Repaid(e) => Some(e.user),
            VaultEvent::InterestAccrued(e) => Some(e.user),
            VaultEvent::Liquidated(e) => Some(e.user),
            _ => None,
        }
    }
}
