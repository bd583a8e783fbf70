//! Access control primitives for the vault
//!
//! Single-owner administration and a composable pause switch. Re-entrant
//! calls cannot occur: every mutator takes `&mut Vault`, so the borrow
//! checker serializes them.

use types::ids::AccountId;

/// Single-owner access control.
///
/// The owner may pause, swap collaborators, and hand over or renounce
/// ownership. After renouncement no account is owner.
#[derive(Debug, Clone)]
pub struct Ownable {
    owner: Option<AccountId>,
}

impl Ownable {
    pub fn new(owner: AccountId) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn owner(&self) -> Option<AccountId> {
        self.owner
    }

    pub fn is_owner(&self, caller: &AccountId) -> bool {
        self.owner.as_ref() == Some(caller)
    }

    /// Transfer ownership. Returns the previous owner, or `None` if the
    /// caller is not the owner.
    pub fn transfer(&mut self, caller: &AccountId, new_owner: AccountId) -> Option<AccountId> {
        if !self.is_owner(caller) {
            return None;
        }
        self.owner.replace(new_owner)
    }

    /// Give up ownership permanently. Returns `false` if the caller is not the owner.
    pub fn renounce(&mut self, caller: &AccountId) -> bool {
        if !self.is_owner(caller) {
            return false;
        }
        self.owner = None;
        true
    }
}

/// Composable pause modifier.
///
/// When paused, protected operations must be rejected.
#[derive(Debug, Clone, Default)]
pub struct PauseGuard {
    paused: bool,
}

impl PauseGuard {
    pub fn new() -> Self {
        Self { paused: false }
    }

    /// Pause operations. Returns `false` if already paused.
    pub fn pause(&mut self) -> bool {
        !std::mem::replace(&mut self.paused, true)
    }

    /// Unpause operations. Returns `false` if not paused.
    pub fn unpause(&mut self) -> bool {
        std::mem::replace(&mut self.paused, false)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownable_transfer() {
        let owner = AccountId::new();
        let next = AccountId::new();
        let mut ownable = Ownable::new(owner);

        assert!(ownable.is_owner(&owner));
        assert_eq!(ownable.transfer(&owner, next), Some(owner));
        assert!(ownable.is_owner(&next));
        assert!(!ownable.is_owner(&owner));
    }

    #[test]
    fn test_ownable_non_owner_cannot_transfer() {
        let owner = AccountId::new();
        let intruder = AccountId::new();
        let mut ownable = Ownable::new(owner);

        assert_eq!(ownable.transfer(&intruder, intruder), None);
        assert_eq!(ownable.owner(), Some(owner));
    }

    #[test]
    fn test_ownable_renounce() {
        let owner = AccountId::new();
        let mut ownable = Ownable::new(owner);

        assert!(!ownable.renounce(&AccountId::new()));
        assert!(ownable.renounce(&owner));
        assert_eq!(ownable.owner(), None);
        assert!(!ownable.is_owner(&owner));
        // Nobody can act as owner afterwards
        assert!(!ownable.renounce(&owner));
    }

    #[test]
    fn test_pause_guard() {
        let mut guard = PauseGuard::new();
        assert!(!guard.is_paused());
        assert!(guard.pause());
        assert!(guard.is_paused());
        assert!(!guard.pause(), "double pause reports no change");
        assert!(guard.unpause());
        assert!(!guard.is_paused());
        assert!(!guard.unpause());
    }
}
