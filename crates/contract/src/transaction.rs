//! Fully resolved ledger transaction, as handed to the validator by the host.

use serde::{Deserialize, Serialize};

use bankcash_core::{ContractState, Party, PublicKey, TransactionId};

use crate::command::{Command, CommandData};
use crate::state::CashState;

/// Identifier of the cash contract on the ledger.
pub const CASH_CONTRACT_ID: &str = "bankcash.contract.cash";

/// A state governed by some other contract.
///
/// The cash contract never interprets these; finding one where a cash state is
/// required means the caller built a malformed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignState {
    pub contract_id: String,
    pub participants: Vec<Party>,
}

impl ContractState for ForeignState {
    fn participants(&self) -> Vec<Party> {
        self.participants.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerState {
    Cash(CashState),
    Foreign(ForeignState),
}

impl LedgerState {
    pub fn as_cash(&self) -> Option<&CashState> {
        match self {
            LedgerState::Cash(state) => Some(state),
            LedgerState::Foreign(_) => None,
        }
    }

    pub fn contract_id(&self) -> &str {
        match self {
            LedgerState::Cash(_) => CASH_CONTRACT_ID,
            LedgerState::Foreign(state) => &state.contract_id,
        }
    }
}

impl From<CashState> for LedgerState {
    fn from(value: CashState) -> Self {
        LedgerState::Cash(value)
    }
}

impl From<ForeignState> for LedgerState {
    fn from(value: ForeignState) -> Self {
        LedgerState::Foreign(value)
    }
}

/// Consumed inputs, produced outputs and the commands authorising the change.
///
/// Inputs are resolved states, not references. Signer keys are the ones the
/// host has already matched against real signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: TransactionId,
    pub inputs: Vec<LedgerState>,
    pub outputs: Vec<LedgerState>,
    pub commands: Vec<Command>,
}

impl LedgerTransaction {
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_input(mut self, state: impl Into<LedgerState>) -> Self {
        self.inputs.push(state.into());
        self
    }

    pub fn with_output(mut self, state: impl Into<LedgerState>) -> Self {
        self.outputs.push(state.into());
        self
    }

    pub fn with_command(
        mut self,
        value: impl Into<CommandData>,
        signers: impl IntoIterator<Item = PublicKey>,
    ) -> Self {
        self.commands.push(Command::new(value, signers));
        self
    }

    /// Every key declared as a signer by any command, deduplicated.
    pub fn required_signers(&self) -> Vec<PublicKey> {
        let mut keys: Vec<PublicKey> = self
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn cash_outputs(&self) -> impl Iterator<Item = &CashState> + '_ {
        self.outputs.iter().filter_map(LedgerState::as_cash)
    }

    pub fn cash_inputs(&self) -> impl Iterator<Item = &CashState> + '_ {
        self.inputs.iter().filter_map(LedgerState::as_cash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CashCommand;
    use bankcash_core::{Amount, Currency};

    #[test]
    fn required_signers_are_deduplicated_across_commands() {
        let a = PublicKey::from_bytes([1; 32]);
        let b = PublicKey::from_bytes([2; 32]);
        let tx = LedgerTransaction::new(TransactionId::new())
            .with_command(CashCommand::Transfer, [a, b, a])
            .with_command(
                CommandData::Foreign {
                    contract_id: "other".into(),
                    name: "Move".into(),
                },
                [b],
            );
        assert_eq!(tx.required_signers(), vec![a, b]);
    }

    #[test]
    fn ledger_state_serializes_with_kind_tag() {
        let bank = Party::new("Bank", PublicKey::from_bytes([9; 32]));
        let state: LedgerState =
            CashState::new(Amount::new(1, Currency::USD), bank.clone(), bank).into();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["kind"], "cash");
        let back: LedgerState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.contract_id(), CASH_CONTRACT_ID);
    }
}
