//! `bankcash-core`: ledger value types shared by the cash contract and flows.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod amount;
pub mod error;
pub mod id;
pub mod party;
pub mod state;
pub mod value_object;

pub use amount::{Amount, Currency, Tally};
pub use error::{DomainError, DomainResult};
pub use id::{LinearId, TransactionId};
pub use party::{Party, PublicKey};
pub use state::{ContractState, LinearState};
pub use value_object::ValueObject;
