//! Host implementations of the collaborator traits.

mod in_memory;

pub use in_memory::InMemoryLedger;
