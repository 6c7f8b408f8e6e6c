use core::fmt;

use serde::{Deserialize, Serialize};

use bankcash_core::{Amount, ContractState, LinearId, LinearState, Party};

/// An amount of one currency held by `owner` and underwritten by `bank`.
///
/// Immutable: every change of owner or amount produces a new value. Versions
/// of the same position share a [`LinearId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CashState {
    amount: Amount,
    bank: Party,
    owner: Party,
    linear_id: LinearId,
}

impl CashState {
    /// A brand-new position with a fresh identifier.
    pub fn new(amount: Amount, bank: Party, owner: Party) -> Self {
        Self::from_parts(amount, bank, owner, LinearId::new())
    }

    /// Rebuild a state whose identifier is already known (e.g. loaded from a vault).
    pub fn from_parts(amount: Amount, bank: Party, owner: Party, linear_id: LinearId) -> Self {
        Self {
            amount,
            bank,
            owner,
            linear_id,
        }
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn bank(&self) -> &Party {
        &self.bank
    }

    pub fn owner(&self) -> &Party {
        &self.owner
    }

    /// Same position, new holder.
    pub fn with_new_owner(&self, owner: Party) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }

    /// Same position with the owner cleared to the null party.
    ///
    /// Only used as an intermediate while computing change; an unowned state is
    /// never a valid output.
    pub fn without_owner(&self) -> Self {
        self.with_new_owner(Party::null())
    }

    /// Same position and holder, different amount.
    pub fn with_amount(&self, amount: Amount) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    pub fn is_unowned(&self) -> bool {
        self.owner.is_null()
    }
}

impl ContractState for CashState {
    fn participants(&self) -> Vec<Party> {
        vec![self.owner.clone()]
    }
}

impl LinearState for CashState {
    fn linear_id(&self) -> LinearId {
        self.linear_id
    }
}

impl fmt::Display for CashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CashState(amount={}, bank={}, owner={}, linear_id={})",
            self.amount, self.bank, self.owner, self.linear_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankcash_core::{Currency, PublicKey};

    fn party(name: &str, byte: u8) -> Party {
        Party::new(name, PublicKey::from_bytes([byte; 32]))
    }

    fn ten_dollars() -> CashState {
        let bank = party("Bank", 1);
        CashState::new(
            Amount::from_major(10, Currency::USD).unwrap(),
            bank.clone(),
            bank,
        )
    }

    #[test]
    fn new_owner_keeps_position_and_issuer() {
        let cash = ten_dollars();
        let alice = party("Alice", 2);
        let moved = cash.with_new_owner(alice.clone());

        assert_eq!(moved.linear_id(), cash.linear_id());
        assert_eq!(moved.bank(), cash.bank());
        assert_eq!(moved.amount(), cash.amount());
        assert_eq!(moved.owner(), &alice);
        // original untouched
        assert_eq!(cash.owner(), cash.bank());
    }

    #[test]
    fn without_owner_is_a_placeholder() {
        let cash = ten_dollars();
        let detached = cash.without_owner();
        assert!(detached.is_unowned());
        assert!(!cash.is_unowned());
        assert_eq!(detached.linear_id(), cash.linear_id());
    }

    #[test]
    fn equal_fields_with_different_ids_are_distinct_positions() {
        let bank = party("Bank", 1);
        let amount = Amount::new(100, Currency::USD);
        let a = CashState::new(amount, bank.clone(), bank.clone());
        let b = CashState::new(amount, bank.clone(), bank);
        assert_ne!(a.linear_id(), b.linear_id());
        assert_ne!(a, b);
    }

    #[test]
    fn participants_are_the_owner() {
        let cash = ten_dollars().with_new_owner(party("Alice", 2));
        assert_eq!(cash.participant_keys(), vec![PublicKey::from_bytes([2; 32])]);
    }
}
