use serde::{Deserialize, Serialize};

use bankcash_core::Party;

use crate::error::FlowError;
use crate::ledger::{SignedTransaction, TransactionSignature};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderPolicy {
    /// Sign anything the cash contract accepts and that names us as a signer.
    #[default]
    VerifyAndSign,
    Refuse,
}

/// Counterparty side of a signature request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashResponder {
    pub me: Party,
    pub policy: ResponderPolicy,
}

impl CashResponder {
    pub fn new(me: Party, policy: ResponderPolicy) -> Self {
        Self { me, policy }
    }

    pub fn respond(&self, stx: &SignedTransaction) -> Result<TransactionSignature, FlowError> {
        if self.policy == ResponderPolicy::Refuse {
            return Err(self.refuse("signing disabled"));
        }

        stx.verify_contract()?;

        let key = self.me.owning_key();
        if !stx.tx.required_signers().contains(&key) {
            return Err(self.refuse("not a required signer"));
        }

        tracing::debug!(party = %self.me, tx = %stx.id(), "counterparty signed");
        Ok(TransactionSignature::by(key))
    }

    fn refuse(&self, reason: &str) -> FlowError {
        FlowError::CounterpartyRefused {
            party: self.me.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionBuilder;
    use bankcash_contract::{CashCommand, CashState, RejectionReason};
    use bankcash_core::{Amount, Currency, PublicKey};

    fn party(name: &str, byte: u8) -> Party {
        Party::new(name, PublicKey::from_bytes([byte; 32]))
    }

    fn issuance(bank: &Party, units: u64) -> SignedTransaction {
        let mut builder = TransactionBuilder::new(party("Notary", 10));
        builder
            .add_output_state(CashState::new(
                Amount::new(units, Currency::USD),
                bank.clone(),
                bank.clone(),
            ))
            .add_command(CashCommand::Issue, [bank.owning_key()]);
        builder.sign_initial(&[])
    }

    #[test]
    fn signs_valid_transactions_naming_us() {
        let bank = party("Bank", 1);
        let responder = CashResponder::new(bank.clone(), ResponderPolicy::VerifyAndSign);
        let signature = responder.respond(&issuance(&bank, 100)).unwrap();
        assert_eq!(signature.by, bank.owning_key());
    }

    #[test]
    fn refuses_when_not_a_signer() {
        let responder = CashResponder::new(party("Bob", 3), ResponderPolicy::default());
        let err = responder.respond(&issuance(&party("Bank", 1), 100)).unwrap_err();
        assert!(matches!(err, FlowError::CounterpartyRefused { .. }));
    }

    #[test]
    fn refuses_contract_violations() {
        let bank = party("Bank", 1);
        let responder = CashResponder::new(bank.clone(), ResponderPolicy::VerifyAndSign);
        let err = responder.respond(&issuance(&bank, 0)).unwrap_err();
        assert_eq!(err.rejection(), Some(RejectionReason::NonPositiveIssuance));
    }

    #[test]
    fn refuse_policy_never_signs() {
        let bank = party("Bank", 1);
        let responder = CashResponder::new(bank.clone(), ResponderPolicy::Refuse);
        assert!(responder.respond(&issuance(&bank, 100)).is_err());
    }
}
