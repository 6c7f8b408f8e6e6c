//! Transaction plumbing used by flows: references to recorded states, the
//! builder, and signed / finalised transactions.
//!
//! Signatures are mock values naming the key that signed. Checking real
//! signature bytes is the host's job.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bankcash_contract::{CashCommand, CashState, LedgerTransaction, VerifyError, verify};
use bankcash_core::{LinearId, LinearState, Party, PublicKey, TransactionId};

use crate::error::FlowError;

/// Pointer to output `index` of transaction `tx_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: TransactionId,
    pub index: usize,
}

impl core::fmt::Display for StateRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

/// A recorded cash state together with where it lives and who notarises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: CashState,
    pub reference: StateRef,
    pub notary: Party,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
}

impl TransactionSignature {
    pub fn by(key: PublicKey) -> Self {
        Self { by: key }
    }
}

/// Mutable staging area for a transaction before it is signed.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    id: TransactionId,
    notary: Party,
    inputs: Vec<StateAndRef>,
    outputs: Vec<CashState>,
    command: Option<(CashCommand, Vec<PublicKey>)>,
}

impl TransactionBuilder {
    pub fn new(notary: Party) -> Self {
        Self {
            id: TransactionId::new(),
            notary,
            inputs: Vec::new(),
            outputs: Vec::new(),
            command: None,
        }
    }

    pub fn notary(&self) -> &Party {
        &self.notary
    }

    pub fn inputs(&self) -> &[StateAndRef] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[CashState] {
        &self.outputs
    }

    /// Stage an input. All inputs must be notarised by the builder's notary.
    pub fn add_input_state(&mut self, input: StateAndRef) -> Result<&mut Self, FlowError> {
        if input.notary != self.notary {
            return Err(FlowError::NotaryMismatch {
                reference: input.reference,
                expected: self.notary.name().to_string(),
                found: input.notary.name().to_string(),
            });
        }
        self.inputs.push(input);
        Ok(self)
    }

    pub fn add_output_state(&mut self, output: CashState) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Set the cash command. A builder carries one; setting it again replaces it.
    pub fn add_command(
        &mut self,
        command: CashCommand,
        signers: impl IntoIterator<Item = PublicKey>,
    ) -> &mut Self {
        let mut signers: Vec<PublicKey> = signers.into_iter().collect();
        signers.sort();
        signers.dedup();
        self.command = Some((command, signers));
        self
    }

    pub fn to_ledger_transaction(&self) -> LedgerTransaction {
        let mut tx = LedgerTransaction::new(self.id);
        for input in &self.inputs {
            tx = tx.with_input(input.state.clone());
        }
        for output in &self.outputs {
            tx = tx.with_output(output.clone());
        }
        if let Some((command, signers)) = &self.command {
            tx = tx.with_command(*command, signers.iter().copied());
        }
        tx
    }

    /// Freeze the builder and sign with our own keys.
    pub fn sign_initial(&self, keys: &[PublicKey]) -> SignedTransaction {
        SignedTransaction {
            tx: self.to_ledger_transaction(),
            input_refs: self.inputs.iter().map(|i| i.reference).collect(),
            notary: self.notary.clone(),
            signatures: keys.iter().copied().map(TransactionSignature::by).collect(),
        }
    }
}

/// A frozen transaction plus the signatures gathered so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: LedgerTransaction,
    pub input_refs: Vec<StateRef>,
    pub notary: Party,
    pub signatures: BTreeSet<TransactionSignature>,
}

impl SignedTransaction {
    pub fn id(&self) -> TransactionId {
        self.tx.id
    }

    pub fn add_signature(&mut self, signature: TransactionSignature) {
        self.signatures.insert(signature);
    }

    pub fn with_signature(mut self, signature: TransactionSignature) -> Self {
        self.add_signature(signature);
        self
    }

    pub fn signed_by(&self) -> BTreeSet<PublicKey> {
        self.signatures.iter().map(|s| s.by).collect()
    }

    /// Required signer keys that have not signed yet.
    pub fn missing_signatures(&self) -> Vec<PublicKey> {
        let signed = self.signed_by();
        self.tx
            .required_signers()
            .into_iter()
            .filter(|k| !signed.contains(k))
            .collect()
    }

    /// Every required signer has signed except, possibly, the `allowed` keys.
    pub fn verify_signatures_except(&self, allowed: &[PublicKey]) -> Result<(), FlowError> {
        let missing: Vec<PublicKey> = self
            .missing_signatures()
            .into_iter()
            .filter(|k| !allowed.contains(k))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FlowError::MissingSignatures(missing))
        }
    }

    pub fn verify_required_signatures(&self) -> Result<(), FlowError> {
        self.verify_signatures_except(&[])
    }

    pub fn verify_contract(&self) -> Result<(), VerifyError> {
        verify(&self.tx)
    }
}

/// A transaction the notary has accepted and the ledger has recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalisedTransaction {
    pub tx: SignedTransaction,
    pub notary_signature: TransactionSignature,
    pub notarised_at: DateTime<Utc>,
}

impl FinalisedTransaction {
    pub fn id(&self) -> TransactionId {
        self.tx.id()
    }

    pub fn outputs(&self) -> Vec<&CashState> {
        self.tx.tx.cash_outputs().collect()
    }

    pub fn output_linear_ids(&self) -> Vec<LinearId> {
        self.tx.tx.cash_outputs().map(LinearState::linear_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankcash_core::{Amount, Currency};

    fn party(name: &str, byte: u8) -> Party {
        Party::new(name, PublicKey::from_bytes([byte; 32]))
    }

    fn recorded(owner: &Party, notary: &Party) -> StateAndRef {
        let bank = party("Bank", 1);
        StateAndRef {
            state: CashState::new(Amount::new(500, Currency::USD), bank, owner.clone()),
            reference: StateRef {
                tx_id: TransactionId::new(),
                index: 0,
            },
            notary: notary.clone(),
        }
    }

    #[test]
    fn inputs_must_share_the_builder_notary() {
        let alice = party("Alice", 2);
        let notary = party("Notary", 10);
        let other = party("OtherNotary", 11);
        let mut builder = TransactionBuilder::new(notary.clone());

        assert!(builder.add_input_state(recorded(&alice, &notary)).is_ok());
        let err = builder.add_input_state(recorded(&alice, &other)).unwrap_err();
        assert!(matches!(err, FlowError::NotaryMismatch { .. }));
        assert_eq!(builder.inputs().len(), 1);
    }

    #[test]
    fn missing_signatures_tracks_collection() {
        let alice = party("Alice", 2);
        let bob = party("Bob", 3);
        let notary = party("Notary", 10);
        let input = recorded(&alice, &notary);

        let mut builder = TransactionBuilder::new(notary);
        builder
            .add_input_state(input.clone())
            .unwrap()
            .add_output_state(input.state.with_new_owner(bob.clone()))
            .add_command(
                CashCommand::Transfer,
                [alice.owning_key(), bob.owning_key(), alice.owning_key()],
            );

        let stx = builder.sign_initial(&[alice.owning_key()]);
        assert_eq!(stx.missing_signatures(), vec![bob.owning_key()]);
        assert!(stx.verify_signatures_except(&[bob.owning_key()]).is_ok());
        assert_eq!(
            stx.verify_required_signatures(),
            Err(FlowError::MissingSignatures(vec![bob.owning_key()]))
        );

        let stx = stx.with_signature(TransactionSignature::by(bob.owning_key()));
        assert!(stx.verify_required_signatures().is_ok());
        assert_eq!(stx.verify_contract(), Ok(()));
        assert_eq!(stx.input_refs, vec![input.reference]);
    }
}
