//! Ledger state traits shared by contracts and the flow layer.

use crate::id::LinearId;
use crate::party::{Party, PublicKey};

/// Anything that can be recorded on the ledger.
pub trait ContractState: Clone + core::fmt::Debug {
    /// Parties that must learn about (and store) this state.
    fn participants(&self) -> Vec<Party>;

    fn participant_keys(&self) -> Vec<PublicKey> {
        self.participants().iter().map(Party::owning_key).collect()
    }
}

/// A state that evolves over successive transactions under one identifier.
///
/// Replacement versions share the same [`LinearId`]; two instances with
/// different ids are distinct positions even when every other field matches.
pub trait LinearState: ContractState {
    fn linear_id(&self) -> LinearId;
}
