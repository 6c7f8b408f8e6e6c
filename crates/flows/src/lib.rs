//! Cash flows: build, sign, collect signatures for and finalise cash
//! transactions on top of host-provided services.
//!
//! The host platform owns notarisation, messaging and the vault. This crate
//! talks to it only through the collaborator traits in [`services`];
//! [`host::InMemoryLedger`] implements them for tests and the simulator.

pub mod config;
pub mod error;
pub mod flow;
pub mod host;
pub mod ledger;
pub mod progress;
pub mod services;

pub use config::{ConfigError, FlowConfig};
pub use error::{FlowError, HostError};
pub use flow::{CashResponder, DestroyCash, Flow, FlowContext, IssueCash, ResponderPolicy, TransferCash};
pub use host::InMemoryLedger;
pub use ledger::{
    FinalisedTransaction, SignedTransaction, StateAndRef, StateRef, TransactionBuilder,
    TransactionSignature,
};
pub use progress::{ProgressStep, ProgressTracker};
pub use services::{
    Finality, IdentityResolver, NotarySelector, Services, SignatureCollector, StateLookup,
};
