//! Command vocabulary.
//!
//! A command states the intent of a transaction. The cash commands carry no
//! fields: amounts and owners travel in the transaction's states.

use serde::{Deserialize, Serialize};

use bankcash_core::PublicKey;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCommand {
    Issue,
    Transfer,
    Destroy,
}

/// Command payload as seen by the host, which may batch commands of several
/// contracts in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contract", content = "value", rename_all = "snake_case")]
pub enum CommandData {
    Cash(CashCommand),
    Foreign { contract_id: String, name: String },
}

impl From<CashCommand> for CommandData {
    fn from(value: CashCommand) -> Self {
        CommandData::Cash(value)
    }
}

/// A command together with the keys declared as its required signers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub value: CommandData,
    pub signers: Vec<PublicKey>,
}

impl Command {
    pub fn new(value: impl Into<CommandData>, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            value: value.into(),
            signers: signers.into_iter().collect(),
        }
    }

    pub fn as_cash(&self) -> Option<CashCommand> {
        match &self.value {
            CommandData::Cash(cmd) => Some(*cmd),
            CommandData::Foreign { .. } => None,
        }
    }
}
