//! Pairing table
//!
//! Symmetric user <-> partner mapping stored as two directed entries so
//! either side resolves its partner in O(1). Entries are only ever inserted
//! or removed in twos.

use std::collections::HashMap;

use crate::error::AppError;
use crate::types::UserId;

#[derive(Debug, Default)]
pub struct PairingTable {
    partners: HashMap<UserId, UserId>,
}

impl PairingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair two users
    ///
    /// Fails with `AlreadyPaired` if either side already has a partner, or
    /// if both sides are the same user. Nothing is inserted on failure.
    pub fn pair(&mut self, a: UserId, b: UserId) -> Result<(), AppError> {
        if a == b || self.partners.contains_key(&a) {
            return Err(AppError::AlreadyPaired(a));
        }
        if self.partners.contains_key(&b) {
            return Err(AppError::AlreadyPaired(b));
        }

        self.partners.insert(a, b);
        self.partners.insert(b, a);
        Ok(())
    }

    pub fn partner_of(&self, id: UserId) -> Option<UserId> {
        self.partners.get(&id).copied()
    }

    pub fn is_paired(&self, id: UserId) -> bool {
        self.partners.contains_key(&id)
    }

    /// Dissolve the user's pair, returning the former partner
    pub fn unpair(&mut self, id: UserId) -> Option<UserId> {
        let partner = self.partners.remove(&id)?;
        self.partners.remove(&partner);
        Some(partner)
    }

    /// Number of active pairs
    pub fn len(&self) -> usize {
        self.partners.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_symmetric() {
        let mut table = PairingTable::new();
        let (x, y) = (UserId::new(), UserId::new());

        table.pair(x, y).unwrap();
        assert_eq!(table.partner_of(x), Some(y));
        assert_eq!(table.partner_of(y), Some(x));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unpair_removes_both_sides() {
        let mut table = PairingTable::new();
        let (x, y) = (UserId::new(), UserId::new());
        table.pair(x, y).unwrap();

        assert_eq!(table.unpair(y), Some(x));
        assert!(table.partner_of(x).is_none());
        assert!(table.partner_of(y).is_none());
        assert!(table.is_empty());

        assert!(table.unpair(x).is_none());
    }

    #[test]
    fn test_pair_rejects_already_paired() {
        let mut table = PairingTable::new();
        let (x, y, z) = (UserId::new(), UserId::new(), UserId::new());
        table.pair(x, y).unwrap();

        assert!(matches!(table.pair(z, y), Err(AppError::AlreadyPaired(id)) if id == y));
        assert!(matches!(table.pair(x, z), Err(AppError::AlreadyPaired(id)) if id == x));

        // Failed attempts leave no half-entries behind
        assert!(table.partner_of(z).is_none());
        assert_eq!(table.partner_of(x), Some(y));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_pair_with_self_rejected() {
        let mut table = PairingTable::new();
        let x = UserId::new();
        assert!(table.pair(x, x).is_err());
        assert!(table.is_empty());
    }
}
