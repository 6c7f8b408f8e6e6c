//! Flow and host error types.

use thiserror::Error;

use bankcash_contract::{RejectionReason, VerifyError};
use bankcash_core::{Amount, DomainError, LinearId, PublicKey};

use crate::ledger::StateRef;

/// Failure inside a host-provided service (vault, identity store).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("lock poisoned")]
    Poisoned,
}

/// Why a flow stopped.
///
/// Contract verdicts arrive unchanged as [`FlowError::Contract`]; everything
/// else is an orchestration concern (missing states, peers, notaries).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("no available notary found")]
    NoNotaryAvailable,

    #[error("'{0}' is not a notary known to this network")]
    UnknownNotary(String),

    #[error("no cash states were selected")]
    NoStatesSelected,

    #[error("cash state {0} not found")]
    StateNotFound(LinearId),

    #[error("cash state {0} was selected more than once")]
    DuplicateState(LinearId),

    #[error("cash state {id} has {count} unconsumed versions")]
    AmbiguousState { id: LinearId, count: usize },

    #[error("only the current owner may move cash state {0}")]
    NotOwner(LinearId),

    #[error("transfer amount must be positive")]
    NonPositiveTransfer,

    #[error("insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds { available: Amount, requested: Amount },

    #[error("a partial transfer needs all inputs issued by one bank")]
    MixedIssuers,

    #[error("output {0} has no owner")]
    UnownedOutput(usize),

    #[error("input {reference} is notarised by '{found}', expected '{expected}'")]
    NotaryMismatch {
        reference: StateRef,
        expected: String,
        found: String,
    },

    #[error("no well-known identity for key {0:?}")]
    UnknownIdentity(PublicKey),

    #[error("missing signatures from {0:?}")]
    MissingSignatures(Vec<PublicKey>),

    #[error("counterparty '{0}' is unreachable")]
    CounterpartyUnavailable(String),

    #[error("counterparty '{party}' refused to sign: {reason}")]
    CounterpartyRefused { party: String, reason: String },

    #[error("transaction has {inputs} inputs but {references} input references")]
    InputReferenceMismatch { inputs: usize, references: usize },

    #[error("input {0} is not a known ledger state")]
    UnknownInput(StateRef),

    #[error("input {0} was already consumed")]
    DoubleSpend(StateRef),

    #[error(transparent)]
    Contract(#[from] VerifyError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl FlowError {
    /// The contract's rejection, when that is what stopped the flow.
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            FlowError::Contract(err) => err.rejection(),
            _ => None,
        }
    }
}
