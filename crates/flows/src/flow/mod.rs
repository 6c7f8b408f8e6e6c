//! Flow execution context and the steps shared by every cash flow.
//!
//! ## Flow shape
//!
//! ```text
//! Generating   build inputs/outputs/command
//!   ↓
//! Signing      sign with our key
//!   ↓
//! Verifying    run the cash contract; check our own signatures
//!   ↓
//! Gathering    ask each counterparty to sign
//!   ↓
//! Finalising   notarise + record
//! ```
//!
//! A contract rejection at Verifying stops the flow before any counterparty
//! is contacted.

mod destroy;
mod issue;
mod responder;
mod transfer;

pub use destroy::DestroyCash;
pub use issue::IssueCash;
pub use responder::{CashResponder, ResponderPolicy};
pub use transfer::TransferCash;

use std::collections::BTreeSet;

use bankcash_core::{LinearId, LinearState, Party};

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::ledger::{FinalisedTransaction, StateAndRef, TransactionBuilder};
use crate::progress::{ProgressStep, ProgressTracker};
use crate::services::Services;

/// A unit of orchestration started by one party.
pub trait Flow {
    type Output;

    /// Stable flow name used in logs.
    const NAME: &'static str;

    fn call<S: Services>(&self, ctx: &mut FlowContext<'_, S>) -> Result<Self::Output, FlowError>;
}

/// Everything a running flow can see: host services, our identity, config
/// and the progress tracker for this run.
pub struct FlowContext<'a, S> {
    services: &'a S,
    me: Party,
    config: &'a FlowConfig,
    progress: ProgressTracker,
}

impl<'a, S: Services> FlowContext<'a, S> {
    pub fn new(services: &'a S, me: Party, config: &'a FlowConfig) -> Self {
        Self {
            services,
            me,
            config,
            progress: ProgressTracker::new("idle"),
        }
    }

    pub fn services(&self) -> &'a S {
        self.services
    }

    pub fn me(&self) -> &Party {
        &self.me
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub(crate) fn step(&mut self, step: ProgressStep) {
        self.progress.set_current_step(step);
    }

    /// Run `flow` inside a tracing span, logging its outcome.
    pub fn run<F: Flow>(&mut self, flow: &F) -> Result<F::Output, FlowError> {
        let span = tracing::info_span!("flow", name = F::NAME, party = %self.me.name());
        let _guard = span.enter();

        self.progress.restart(F::NAME);
        match flow.call(self) {
            Ok(output) => {
                tracing::info!("flow completed");
                Ok(output)
            }
            Err(err) => {
                match err.rejection() {
                    Some(reason) => {
                        tracing::warn!(reason = reason.code(), "contract rejected transaction")
                    }
                    None => tracing::warn!(error = %err, "flow failed"),
                }
                Err(err)
            }
        }
    }

    /// The configured notary if present on the network, else the first one.
    pub fn available_notary(&self) -> Result<Party, FlowError> {
        let notaries = self.services.notaries();
        if let Some(preferred) = &self.config.preferred_notary {
            if let Some(notary) = notaries.iter().find(|n| n.name() == preferred) {
                return Ok(notary.clone());
            }
            tracing::warn!(preferred = %preferred, "preferred notary not found; using first available");
        }
        notaries.into_iter().next().ok_or(FlowError::NoNotaryAvailable)
    }

    /// The single unconsumed version of position `id`.
    pub fn cash_by_linear_id(&self, id: LinearId) -> Result<StateAndRef, FlowError> {
        let mut found = self.services.unconsumed_by_linear_id(id)?;
        match found.len() {
            0 => Err(FlowError::StateNotFound(id)),
            1 => Ok(found.remove(0)),
            count => Err(FlowError::AmbiguousState { id, count }),
        }
    }

    /// One state per id. Naming a position twice is refused before the vault
    /// is queried.
    pub fn cash_by_linear_ids(&self, ids: &[LinearId]) -> Result<Vec<StateAndRef>, FlowError> {
        if ids.is_empty() {
            return Err(FlowError::NoStatesSelected);
        }
        let mut seen = BTreeSet::new();
        if let Some(id) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(FlowError::DuplicateState(*id));
        }
        ids.iter().map(|id| self.cash_by_linear_id(*id)).collect()
    }

    /// Only the current owner may start a flow spending these states.
    pub fn ensure_owned(&self, states: &[StateAndRef]) -> Result<(), FlowError> {
        for input in states {
            if input.state.owner().owning_key() != self.me.owning_key() {
                return Err(FlowError::NotOwner(input.state.linear_id()));
            }
        }
        Ok(())
    }

    /// Sign, verify, gather counterparty signatures and finalise.
    pub(crate) fn sign_and_finalise(
        &mut self,
        builder: &TransactionBuilder,
        counterparties: &[Party],
    ) -> Result<FinalisedTransaction, FlowError> {
        let me = self.me.owning_key();
        let peers: BTreeSet<Party> = counterparties
            .iter()
            .filter(|p| p.owning_key() != me)
            .cloned()
            .collect();
        let peer_keys: Vec<_> = peers.iter().map(Party::owning_key).collect();

        self.step(ProgressStep::SigningTransaction);
        let mut stx = builder.sign_initial(&[me]);

        self.step(ProgressStep::VerifyingTransaction);
        stx.verify_contract()?;
        stx.verify_signatures_except(&peer_keys)?;

        self.step(ProgressStep::GatheringSignatures);
        for peer in &peers {
            let signature = self.services.collect_signature(&stx, peer)?;
            tracing::info!(counterparty = %peer, "collected signature");
            stx.add_signature(signature);
        }

        self.step(ProgressStep::FinalisingTransaction);
        let finalised = self.services.finalise(stx)?;
        tracing::info!(tx = %finalised.id(), notary = %finalised.tx.notary, "transaction finalised");
        Ok(finalised)
    }
}
