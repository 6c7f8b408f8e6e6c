//! Verdicts of the cash contract.
//!
//! A [`RejectionReason`] is a terminal, deterministic verdict on a well-formed
//! transaction: resubmitting the same transaction yields the same reason. A
//! [`MalformedTransaction`] means the caller broke the input contract (it put a
//! state of another contract where cash was required) and is kept apart so it
//! is never mistaken for a business rejection.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bankcash_core::DomainError;

/// Why a transaction is not a legal cash state transition.
///
/// One variant per rule. Serialises as its stable [`code`](Self::code).
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("exactly one cash command is required")]
    MissingOrAmbiguousCommand,

    #[error("no inputs should be consumed when issuing cash")]
    IssuanceHasInputs,

    #[error("newly issued cash must have a positive amount")]
    NonPositiveIssuance,

    #[error("the issuing bank must sign a cash issuance")]
    IssuerNotSigned,

    #[error("a cash transfer must consume at least one input")]
    TransferHasNoInputs,

    #[error("a cash transfer must create at least one output")]
    TransferHasNoOutputs,

    #[error("all amounts in a cash transfer must share one currency")]
    CurrencyMismatch,

    #[error("the sum of transfer inputs must be positive")]
    TransferInputSumNotPositive,

    #[error("the sum of transfer outputs must be positive")]
    TransferOutputSumNotPositive,

    #[error("the sum of transfer inputs must equal the sum of outputs")]
    TransferSumMismatch,

    #[error("every previous owner must sign a cash transfer")]
    OldOwnerNotSigned,

    #[error("every new owner must sign a cash transfer")]
    NewOwnerNotSigned,

    #[error("a destroy transaction must not create outputs")]
    DestroyHasOutputs,

    #[error("the owner and the issuing bank must sign the destruction of their cash")]
    OwnerOrBankNotSigned,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 14] = [
        RejectionReason::MissingOrAmbiguousCommand,
        RejectionReason::IssuanceHasInputs,
        RejectionReason::NonPositiveIssuance,
        RejectionReason::IssuerNotSigned,
        RejectionReason::TransferHasNoInputs,
        RejectionReason::TransferHasNoOutputs,
        RejectionReason::CurrencyMismatch,
        RejectionReason::TransferInputSumNotPositive,
        RejectionReason::TransferOutputSumNotPositive,
        RejectionReason::TransferSumMismatch,
        RejectionReason::OldOwnerNotSigned,
        RejectionReason::NewOwnerNotSigned,
        RejectionReason::DestroyHasOutputs,
        RejectionReason::OwnerOrBankNotSigned,
    ];

    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingOrAmbiguousCommand => "missing_or_ambiguous_command",
            RejectionReason::IssuanceHasInputs => "issuance_has_inputs",
            RejectionReason::NonPositiveIssuance => "non_positive_issuance",
            RejectionReason::IssuerNotSigned => "issuer_not_signed",
            RejectionReason::TransferHasNoInputs => "transfer_has_no_inputs",
            RejectionReason::TransferHasNoOutputs => "transfer_has_no_outputs",
            RejectionReason::CurrencyMismatch => "currency_mismatch",
            RejectionReason::TransferInputSumNotPositive => "transfer_input_sum_not_positive",
            RejectionReason::TransferOutputSumNotPositive => "transfer_output_sum_not_positive",
            RejectionReason::TransferSumMismatch => "transfer_sum_mismatch",
            RejectionReason::OldOwnerNotSigned => "old_owner_not_signed",
            RejectionReason::NewOwnerNotSigned => "new_owner_not_signed",
            RejectionReason::DestroyHasOutputs => "destroy_has_outputs",
            RejectionReason::OwnerOrBankNotSigned => "owner_or_bank_not_signed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StatePosition {
    Input,
    Output,
}

impl fmt::Display for StatePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatePosition::Input => f.write_str("input"),
            StatePosition::Output => f.write_str("output"),
        }
    }
}

/// A state that cannot be read as cash sat where the command requires cash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{position} {index} belongs to contract '{contract_id}', expected cash")]
pub struct MalformedTransaction {
    pub position: StatePosition,
    pub index: usize,
    pub contract_id: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("transaction rejected: {0}")]
    Rejected(#[from] RejectionReason),

    #[error("malformed transaction: {0}")]
    Malformed(#[from] MalformedTransaction),

    /// Amount arithmetic failed for a reason other than mixed currencies.
    #[error("amount arithmetic failed: {0}")]
    Arithmetic(DomainError),
}

impl VerifyError {
    /// The business rejection, if this is one.
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            VerifyError::Rejected(reason) => Some(*reason),
            VerifyError::Malformed(_) | VerifyError::Arithmetic(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_match_serialized_names() {
        for reason in RejectionReason::ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn codes_and_messages_are_unique() {
        let codes: HashSet<_> = RejectionReason::ALL.iter().map(|r| r.code()).collect();
        let messages: HashSet<_> = RejectionReason::ALL.iter().map(|r| r.to_string()).collect();
        assert_eq!(codes.len(), RejectionReason::ALL.len());
        assert_eq!(messages.len(), RejectionReason::ALL.len());
    }

    #[test]
    fn malformed_errors_carry_no_rejection() {
        let err = VerifyError::from(MalformedTransaction {
            position: StatePosition::Output,
            index: 2,
            contract_id: "acme.bonds".into(),
        });
        assert_eq!(err.rejection(), None);
        assert_eq!(
            err.to_string(),
            "malformed transaction: output 2 belongs to contract 'acme.bonds', expected cash"
        );
    }
}
