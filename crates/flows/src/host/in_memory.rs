use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use chrono::Utc;

use bankcash_core::{LinearId, LinearState, Party, PublicKey};

use crate::error::{FlowError, HostError};
use crate::flow::{CashResponder, ResponderPolicy};
use crate::ledger::{
    FinalisedTransaction, SignedTransaction, StateAndRef, StateRef, TransactionSignature,
};
use crate::services::{Finality, IdentityResolver, NotarySelector, SignatureCollector, StateLookup};

#[derive(Debug, Clone)]
struct VaultEntry {
    state: StateAndRef,
    consumed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    vault: BTreeMap<StateRef, VaultEntry>,
    identities: BTreeMap<PublicKey, Party>,
    notaries: Vec<Party>,
    responders: BTreeMap<PublicKey, CashResponder>,
    offline: BTreeSet<PublicKey>,
    transactions: Vec<FinalisedTransaction>,
}

/// A whole network in one process: vault, identity service, notaries and
/// counterparties that answer signature requests.
///
/// Intended for tests/dev. Every party shares the same vault.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<Inner>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `party` known to the network. It answers signature requests with
    /// [`ResponderPolicy::VerifyAndSign`] until told otherwise.
    pub fn register_party(&self, party: Party) -> Result<(), HostError> {
        let mut inner = self.inner.write().map_err(|_| HostError::Poisoned)?;
        inner.responders.insert(
            party.owning_key(),
            CashResponder::new(party.clone(), ResponderPolicy::default()),
        );
        inner.identities.insert(party.owning_key(), party);
        Ok(())
    }

    pub fn register_notary(&self, notary: Party) -> Result<(), HostError> {
        let mut inner = self.inner.write().map_err(|_| HostError::Poisoned)?;
        if !inner.notaries.contains(&notary) {
            inner.notaries.push(notary.clone());
        }
        inner.identities.insert(notary.owning_key(), notary);
        Ok(())
    }

    pub fn set_responder_policy(&self, party: &Party, policy: ResponderPolicy) -> Result<(), HostError> {
        let mut inner = self.inner.write().map_err(|_| HostError::Poisoned)?;
        inner
            .responders
            .entry(party.owning_key())
            .or_insert_with(|| CashResponder::new(party.clone(), policy))
            .policy = policy;
        Ok(())
    }

    /// Stop `party` from answering signature requests.
    pub fn take_offline(&self, party: &Party) -> Result<(), HostError> {
        let mut inner = self.inner.write().map_err(|_| HostError::Poisoned)?;
        inner.offline.insert(party.owning_key());
        Ok(())
    }

    /// Every unconsumed state, ordered by reference.
    pub fn unconsumed(&self) -> Result<Vec<StateAndRef>, HostError> {
        self.select(|_| true)
    }

    /// Finalised transactions in the order they were recorded.
    pub fn transactions(&self) -> Result<Vec<FinalisedTransaction>, HostError> {
        let inner = self.inner.read().map_err(|_| HostError::Poisoned)?;
        Ok(inner.transactions.clone())
    }

    fn select(&self, keep: impl Fn(&StateAndRef) -> bool) -> Result<Vec<StateAndRef>, HostError> {
        let inner = self.inner.read().map_err(|_| HostError::Poisoned)?;
        Ok(inner
            .vault
            .values()
            .filter(|entry| !entry.consumed && keep(&entry.state))
            .map(|entry| entry.state.clone())
            .collect())
    }
}

impl StateLookup for InMemoryLedger {
    fn unconsumed_by_linear_id(&self, id: LinearId) -> Result<Vec<StateAndRef>, HostError> {
        self.select(|s| s.state.linear_id() == id)
    }

    fn unconsumed_owned_by(&self, owner: &PublicKey) -> Result<Vec<StateAndRef>, HostError> {
        self.select(|s| s.state.owner().owning_key() == *owner)
    }
}

impl IdentityResolver for InMemoryLedger {
    fn well_known_party(&self, key: &PublicKey) -> Option<Party> {
        let Ok(inner) = self.inner.read() else {
            tracing::error!(key = %key.fingerprint(), "ledger lock poisoned; identity unresolved");
            return None;
        };
        inner.identities.get(key).cloned()
    }
}

impl NotarySelector for InMemoryLedger {
    fn notaries(&self) -> Vec<Party> {
        match self.inner.read() {
            Ok(inner) => inner.notaries.clone(),
            Err(_) => {
                tracing::error!("ledger lock poisoned; no notaries listed");
                Vec::new()
            }
        }
    }
}

impl SignatureCollector for InMemoryLedger {
    fn collect_signature(
        &self,
        tx: &SignedTransaction,
        from: &Party,
    ) -> Result<TransactionSignature, FlowError> {
        let responder = {
            let inner = self.inner.read().map_err(|_| HostError::Poisoned)?;
            let key = from.owning_key();
            if inner.offline.contains(&key) {
                return Err(FlowError::CounterpartyUnavailable(from.name().to_string()));
            }
            inner
                .responders
                .get(&key)
                .cloned()
                .ok_or_else(|| FlowError::CounterpartyUnavailable(from.name().to_string()))?
        };
        responder.respond(tx)
    }
}

impl Finality for InMemoryLedger {
    /// Notarise and record `tx`.
    ///
    /// Re-checks the contract and every required signature, then consumes
    /// inputs and stores outputs under one write lock so two transactions
    /// spending the same state cannot both succeed.
    fn finalise(&self, tx: SignedTransaction) -> Result<FinalisedTransaction, FlowError> {
        let mut inner = self.inner.write().map_err(|_| HostError::Poisoned)?;

        if !inner.notaries.contains(&tx.notary) {
            return Err(FlowError::UnknownNotary(tx.notary.name().to_string()));
        }
        tx.verify_contract()?;
        tx.verify_required_signatures()?;

        if tx.input_refs.len() != tx.tx.inputs.len() {
            return Err(FlowError::InputReferenceMismatch {
                inputs: tx.tx.inputs.len(),
                references: tx.input_refs.len(),
            });
        }
        let mut spent = BTreeSet::new();
        for (reference, input) in tx.input_refs.iter().zip(&tx.tx.inputs) {
            let entry = inner
                .vault
                .get(reference)
                .filter(|e| input.as_cash() == Some(&e.state.state))
                .ok_or(FlowError::UnknownInput(*reference))?;
            if entry.consumed || !spent.insert(*reference) {
                return Err(FlowError::DoubleSpend(*reference));
            }
        }

        for reference in &spent {
            if let Some(entry) = inner.vault.get_mut(reference) {
                entry.consumed = true;
            }
        }
        for (index, output) in tx.tx.outputs.iter().enumerate() {
            let Some(state) = output.as_cash() else {
                continue;
            };
            let reference = StateRef {
                tx_id: tx.id(),
                index,
            };
            inner.vault.insert(
                reference,
                VaultEntry {
                    state: StateAndRef {
                        state: state.clone(),
                        reference,
                        notary: tx.notary.clone(),
                    },
                    consumed: false,
                },
            );
        }

        let finalised = FinalisedTransaction {
            notary_signature: TransactionSignature::by(tx.notary.owning_key()),
            notarised_at: Utc::now(),
            tx,
        };
        tracing::debug!(
            tx = %finalised.id(),
            inputs = spent.len(),
            outputs = finalised.tx.tx.outputs.len(),
            "transaction recorded"
        );
        inner.transactions.push(finalised.clone());
        Ok(finalised)
    }
}
