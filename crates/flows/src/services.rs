//! Collaborator interfaces the host platform provides to flows.
//!
//! Flows never reach into ambient globals: everything they need from the
//! outside world comes through these traits, so a flow can run against a real
//! node or against [`crate::host::InMemoryLedger`] unchanged.

use bankcash_core::{LinearId, Party, PublicKey};

use crate::error::{FlowError, HostError};
use crate::ledger::{FinalisedTransaction, SignedTransaction, StateAndRef, TransactionSignature};

/// Read access to the vault of recorded states.
pub trait StateLookup {
    /// Unconsumed versions of the position `id`. A healthy vault returns at
    /// most one.
    fn unconsumed_by_linear_id(&self, id: LinearId) -> Result<Vec<StateAndRef>, HostError>;

    fn unconsumed_owned_by(&self, owner: &PublicKey) -> Result<Vec<StateAndRef>, HostError>;
}

/// Maps keys to well-known parties.
pub trait IdentityResolver {
    fn well_known_party(&self, key: &PublicKey) -> Option<Party>;

    fn require_well_known(&self, key: &PublicKey) -> Result<Party, FlowError> {
        self.well_known_party(key)
            .ok_or(FlowError::UnknownIdentity(*key))
    }
}

/// Lists the notaries available on the network.
pub trait NotarySelector {
    fn notaries(&self) -> Vec<Party>;
}

/// Opens a session with a counterparty and asks it to sign.
///
/// The counterparty runs its own checks (see [`crate::flow::CashResponder`])
/// and may refuse.
pub trait SignatureCollector {
    fn collect_signature(
        &self,
        tx: &SignedTransaction,
        from: &Party,
    ) -> Result<TransactionSignature, FlowError>;
}

/// Notarises a fully signed transaction and records it on the ledger.
pub trait Finality {
    fn finalise(&self, tx: SignedTransaction) -> Result<FinalisedTransaction, FlowError>;
}

/// Everything a flow needs from its host.
pub trait Services: StateLookup + IdentityResolver + NotarySelector + SignatureCollector + Finality {}

impl<T> Services for T where
    T: StateLookup + IdentityResolver + NotarySelector + SignatureCollector + Finality
{
}
