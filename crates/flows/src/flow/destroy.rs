use std::collections::BTreeSet;

use bankcash_contract::CashCommand;
use bankcash_core::{LinearId, Party};

use crate::error::FlowError;
use crate::ledger::{FinalisedTransaction, TransactionBuilder};
use crate::progress::ProgressStep;
use crate::services::Services;

use super::{Flow, FlowContext};

/// Return the selected positions to their issuers, removing them from the
/// ledger. Each issuing bank co-signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyCash {
    pub linear_ids: Vec<LinearId>,
}

impl DestroyCash {
    pub fn new(linear_ids: impl IntoIterator<Item = LinearId>) -> Self {
        Self {
            linear_ids: linear_ids.into_iter().collect(),
        }
    }
}

impl Flow for DestroyCash {
    type Output = FinalisedTransaction;

    const NAME: &'static str = "destroy_cash";

    fn call<S: Services>(&self, ctx: &mut FlowContext<'_, S>) -> Result<Self::Output, FlowError> {
        ctx.step(ProgressStep::GeneratingTransaction);
        let inputs = ctx.cash_by_linear_ids(&self.linear_ids)?;
        ctx.ensure_owned(&inputs)?;

        let banks = inputs
            .iter()
            .map(|i| ctx.services().require_well_known(&i.state.bank().owning_key()))
            .collect::<Result<BTreeSet<Party>, _>>()?;

        let notary = inputs[0].notary.clone();
        let mut builder = TransactionBuilder::new(notary);
        for input in inputs {
            builder.add_input_state(input)?;
        }
        let signers = std::iter::once(ctx.me().owning_key()).chain(banks.iter().map(Party::owning_key));
        builder.add_command(CashCommand::Destroy, signers);

        let banks: Vec<Party> = banks.into_iter().collect();
        ctx.sign_and_finalise(&builder, &banks)
    }
}
