use bankcash_contract::{CashCommand, CashState, RejectionReason, VerifyError};
use bankcash_core::{Amount, ContractState};

use crate::error::FlowError;
use crate::ledger::{FinalisedTransaction, TransactionBuilder};
use crate::progress::ProgressStep;
use crate::services::Services;

use super::{Flow, FlowContext};

/// The running party mints `amount` as a bank and keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCash {
    pub amount: Amount,
}

impl IssueCash {
    pub fn new(amount: Amount) -> Self {
        Self { amount }
    }
}

impl Flow for IssueCash {
    type Output = FinalisedTransaction;

    const NAME: &'static str = "issue_cash";

    fn call<S: Services>(&self, ctx: &mut FlowContext<'_, S>) -> Result<Self::Output, FlowError> {
        ctx.step(ProgressStep::GeneratingTransaction);
        if !self.amount.is_positive() {
            return Err(VerifyError::from(RejectionReason::NonPositiveIssuance).into());
        }

        let notary = ctx.available_notary()?;
        let me = ctx.me().clone();
        let output = CashState::new(self.amount, me.clone(), me);

        let mut builder = TransactionBuilder::new(notary);
        builder
            .add_command(CashCommand::Issue, output.participant_keys())
            .add_output_state(output);

        ctx.sign_and_finalise(&builder, &[])
    }
}
