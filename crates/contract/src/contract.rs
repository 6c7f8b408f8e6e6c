//! The cash contract's validity predicate.
//!
//! ## Rule order
//!
//! 1. Exactly one cash command among the transaction's commands.
//! 2. Dispatch on that command; inside a branch, rules are checked in a fixed
//!    order and the first violation is returned.
//!
//! The predicate is pure: no state, no IO. Calling it twice on the same
//! transaction returns the same verdict.

use std::collections::HashSet;

use bankcash_core::{DomainError, PublicKey, Tally};

use crate::command::{CashCommand, Command};
use crate::error::{MalformedTransaction, RejectionReason, StatePosition, VerifyError};
use crate::state::CashState;
use crate::transaction::{CASH_CONTRACT_ID, LedgerState, LedgerTransaction};

/// A ledger contract: decides whether a transaction is a legal transition of
/// the states it governs.
pub trait Contract {
    /// Ledger identifier of the contract.
    const ID: &'static str;

    fn verify(&self, tx: &LedgerTransaction) -> Result<(), VerifyError>;
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CashContract;

impl Contract for CashContract {
    const ID: &'static str = CASH_CONTRACT_ID;

    fn verify(&self, tx: &LedgerTransaction) -> Result<(), VerifyError> {
        verify(tx)
    }
}

type Signers = HashSet<PublicKey>;

/// Verify a transaction against the cash rules.
pub fn verify(tx: &LedgerTransaction) -> Result<(), VerifyError> {
    let (command, signers) = require_single_command(&tx.commands)?;

    match command {
        CashCommand::Issue => verify_issue(tx, &signers),
        CashCommand::Transfer => verify_transfer(tx, &signers),
        CashCommand::Destroy => verify_destroy(tx, &signers),
    }
}

fn ensure(condition: bool, reason: RejectionReason) -> Result<(), RejectionReason> {
    if condition { Ok(()) } else { Err(reason) }
}

fn require_single_command(commands: &[Command]) -> Result<(CashCommand, Signers), RejectionReason> {
    let mut cash = commands
        .iter()
        .filter_map(|c| c.as_cash().map(|cmd| (cmd, &c.signers)));

    match (cash.next(), cash.next()) {
        (Some((command, signers)), None) => Ok((command, signers.iter().copied().collect())),
        _ => Err(RejectionReason::MissingOrAmbiguousCommand),
    }
}

/// Read every state in `states` as cash.
fn cash_states(
    states: &[LedgerState],
    position: StatePosition,
) -> Result<Vec<&CashState>, MalformedTransaction> {
    states
        .iter()
        .enumerate()
        .map(|(index, state)| {
            state.as_cash().ok_or_else(|| MalformedTransaction {
                position,
                index,
                contract_id: state.contract_id().to_string(),
            })
        })
        .collect()
}

fn tally(states: &[&CashState]) -> Result<Tally, VerifyError> {
    Tally::of(states.iter().map(|s| s.amount())).map_err(amount_error)
}

/// Only a currency mismatch is a verdict on the transaction; any other
/// arithmetic failure is reported as such.
fn amount_error(err: DomainError) -> VerifyError {
    match err {
        DomainError::CurrencyMismatch { .. } => RejectionReason::CurrencyMismatch.into(),
        other => VerifyError::Arithmetic(other),
    }
}

fn owner_keys(states: &[&CashState]) -> Signers {
    states.iter().map(|s| s.owner().owning_key()).collect()
}

fn verify_issue(tx: &LedgerTransaction, signers: &Signers) -> Result<(), VerifyError> {
    ensure(tx.inputs.is_empty(), RejectionReason::IssuanceHasInputs)?;

    // Several outputs, possibly from several banks: each is checked alone.
    for output in cash_states(&tx.outputs, StatePosition::Output)? {
        ensure(
            output.amount().is_positive(),
            RejectionReason::NonPositiveIssuance,
        )?;
        ensure(
            signers.contains(&output.bank().owning_key()),
            RejectionReason::IssuerNotSigned,
        )?;
    }
    Ok(())
}

fn verify_transfer(tx: &LedgerTransaction, signers: &Signers) -> Result<(), VerifyError> {
    ensure(!tx.inputs.is_empty(), RejectionReason::TransferHasNoInputs)?;
    ensure(!tx.outputs.is_empty(), RejectionReason::TransferHasNoOutputs)?;

    let inputs = cash_states(&tx.inputs, StatePosition::Input)?;
    let outputs = cash_states(&tx.outputs, StatePosition::Output)?;

    let sum_in = tally(&inputs)?;
    let sum_out = tally(&outputs)?;
    ensure(
        sum_in.currency() == sum_out.currency(),
        RejectionReason::CurrencyMismatch,
    )?;

    ensure(
        sum_in.is_positive(),
        RejectionReason::TransferInputSumNotPositive,
    )?;
    ensure(
        sum_out.is_positive(),
        RejectionReason::TransferOutputSumNotPositive,
    )?;
    ensure(
        sum_in.quantity() == sum_out.quantity(),
        RejectionReason::TransferSumMismatch,
    )?;

    let old_owners = owner_keys(&inputs);
    let new_owners = owner_keys(&outputs);
    ensure(
        old_owners.is_subset(signers),
        RejectionReason::OldOwnerNotSigned,
    )?;
    ensure(
        new_owners.is_subset(signers),
        RejectionReason::NewOwnerNotSigned,
    )?;
    Ok(())
}

fn verify_destroy(tx: &LedgerTransaction, signers: &Signers) -> Result<(), VerifyError> {
    ensure(tx.outputs.is_empty(), RejectionReason::DestroyHasOutputs)?;

    // Each input needs its own owner and its own bank.
    for input in cash_states(&tx.inputs, StatePosition::Input)? {
        ensure(
            signers.contains(&input.owner().owning_key())
                && signers.contains(&input.bank().owning_key()),
            RejectionReason::OwnerOrBankNotSigned,
        )?;
    }
    Ok(())
}
