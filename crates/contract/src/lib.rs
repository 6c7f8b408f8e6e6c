//! Cash contract: the state type, command vocabulary and the transaction
//! validity predicate for bank-issued cash.
//!
//! Pure domain logic only: no IO, no logging, no persistence concerns. The
//! validator may be called from any number of threads at once.

pub mod command;
pub mod contract;
pub mod error;
pub mod state;
pub mod transaction;

pub use command::{CashCommand, Command, CommandData};
pub use contract::{CashContract, Contract, verify};
pub use error::{MalformedTransaction, RejectionReason, StatePosition, VerifyError};
pub use state::CashState;
pub use transaction::{CASH_CONTRACT_ID, ForeignState, LedgerState, LedgerTransaction};
