use bankcash_contract::{CashCommand, CashState};
use bankcash_core::{Amount, DomainError, LinearId, Party, Tally};

use crate::error::FlowError;
use crate::ledger::{FinalisedTransaction, StateAndRef, TransactionBuilder};
use crate::progress::ProgressStep;
use crate::services::Services;

use super::{Flow, FlowContext};

/// Move `amount` out of the selected positions to `new_owner`.
///
/// When the positions hold exactly `amount` they are re-owned whole and keep
/// their identifiers. When they hold more, the first position carries the
/// change back to us and the payment becomes a fresh position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCash {
    pub linear_ids: Vec<LinearId>,
    pub new_owner: Party,
    pub amount: Amount,
}

impl TransferCash {
    pub fn new(
        linear_ids: impl IntoIterator<Item = LinearId>,
        new_owner: Party,
        amount: Amount,
    ) -> Self {
        Self {
            linear_ids: linear_ids.into_iter().collect(),
            new_owner,
            amount,
        }
    }

    fn outputs(&self, me: &Party, inputs: &[StateAndRef]) -> Result<Vec<CashState>, FlowError> {
        let total = Tally::of(inputs.iter().map(|i| i.state.amount()))?;
        if let Some(currency) = total.currency() {
            if currency != self.amount.currency() {
                return Err(DomainError::currency_mismatch(currency, self.amount.currency()).into());
            }
        }

        let requested = u128::from(self.amount.quantity());
        if total.quantity() < requested {
            let available = total
                .to_amount()?
                .unwrap_or_else(|| Amount::zero(self.amount.currency()));
            return Err(FlowError::InsufficientFunds {
                available,
                requested: self.amount,
            });
        }

        if total.quantity() == requested {
            return Ok(inputs
                .iter()
                .map(|i| i.state.with_new_owner(self.new_owner.clone()))
                .collect());
        }

        let Some(first) = inputs.first() else {
            return Err(FlowError::NoStatesSelected);
        };
        let bank = first.state.bank();
        if inputs.iter().any(|i| i.state.bank() != bank) {
            return Err(FlowError::MixedIssuers);
        }

        let available = total.to_amount()?.ok_or(FlowError::NoStatesSelected)?;
        let leftover = available.checked_sub(&self.amount)?;
        let change = first
            .state
            .without_owner()
            .with_amount(leftover)
            .with_new_owner(me.clone());
        let payment = CashState::new(self.amount, bank.clone(), self.new_owner.clone());

        Ok(vec![change, payment])
    }
}

impl Flow for TransferCash {
    type Output = FinalisedTransaction;

    const NAME: &'static str = "transfer_cash";

    fn call<S: Services>(&self, ctx: &mut FlowContext<'_, S>) -> Result<Self::Output, FlowError> {
        ctx.step(ProgressStep::GeneratingTransaction);
        if !self.amount.is_positive() {
            return Err(FlowError::NonPositiveTransfer);
        }

        let new_owner = ctx
            .services()
            .require_well_known(&self.new_owner.owning_key())?;
        let inputs = ctx.cash_by_linear_ids(&self.linear_ids)?;
        ctx.ensure_owned(&inputs)?;

        let me = ctx.me().clone();
        let outputs = self.outputs(&me, &inputs)?;
        if let Some(index) = outputs.iter().position(CashState::is_unowned) {
            return Err(FlowError::UnownedOutput(index));
        }

        // inputs stay with the notary that recorded them
        let notary = inputs[0].notary.clone();
        let mut builder = TransactionBuilder::new(notary);
        for input in inputs {
            builder.add_input_state(input)?;
        }
        for output in outputs {
            builder.add_output_state(output);
        }
        builder.add_command(
            CashCommand::Transfer,
            [me.owning_key(), new_owner.owning_key()],
        );

        ctx.sign_and_finalise(&builder, &[new_owner])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StateRef;
    use bankcash_core::{Currency, LinearState, PublicKey, TransactionId};

    fn party(name: &str, byte: u8) -> Party {
        Party::new(name, PublicKey::from_bytes([byte; 32]))
    }

    fn held(units: u64, bank: &Party, owner: &Party) -> StateAndRef {
        StateAndRef {
            state: CashState::new(Amount::new(units, Currency::USD), bank.clone(), owner.clone()),
            reference: StateRef {
                tx_id: TransactionId::new(),
                index: 0,
            },
            notary: party("Notary", 10),
        }
    }

    #[test]
    fn exact_amount_reowns_every_input() {
        let (bank, alice, bob) = (party("Bank", 1), party("Alice", 2), party("Bob", 3));
        let inputs = vec![held(40, &bank, &alice), held(60, &bank, &alice)];
        let flow = TransferCash::new([], bob.clone(), Amount::new(100, Currency::USD));

        let outputs = flow.outputs(&alice, &inputs).unwrap();
        assert_eq!(outputs.len(), 2);
        for (input, output) in inputs.iter().zip(&outputs) {
            assert_eq!(output.linear_id(), input.state.linear_id());
            assert_eq!(output.owner(), &bob);
        }
    }

    #[test]
    fn partial_amount_splits_into_change_and_payment() {
        let (bank, alice, bob) = (party("Bank", 1), party("Alice", 2), party("Bob", 3));
        let inputs = vec![held(100, &bank, &alice)];
        let flow = TransferCash::new([], bob.clone(), Amount::new(30, Currency::USD));

        let outputs = flow.outputs(&alice, &inputs).unwrap();
        let (change, payment) = (&outputs[0], &outputs[1]);
        assert_eq!(change.linear_id(), inputs[0].state.linear_id());
        assert_eq!(change.owner(), &alice);
        assert_eq!(change.amount().quantity(), 70);
        assert_ne!(payment.linear_id(), inputs[0].state.linear_id());
        assert_eq!(payment.owner(), &bob);
        assert_eq!(payment.amount().quantity(), 30);
    }

    #[test]
    fn partial_amount_requires_one_issuer() {
        let alice = party("Alice", 2);
        let inputs = vec![
            held(50, &party("Bank", 1), &alice),
            held(50, &party("OtherBank", 4), &alice),
        ];
        let flow = TransferCash::new([], party("Bob", 3), Amount::new(10, Currency::USD));
        assert_eq!(flow.outputs(&alice, &inputs), Err(FlowError::MixedIssuers));
    }

    #[test]
    fn short_inputs_report_what_is_available() {
        let (bank, alice) = (party("Bank", 1), party("Alice", 2));
        let inputs = vec![held(20, &bank, &alice)];
        let flow = TransferCash::new([], party("Bob", 3), Amount::new(30, Currency::USD));
        assert_eq!(
            flow.outputs(&alice, &inputs),
            Err(FlowError::InsufficientFunds {
                available: Amount::new(20, Currency::USD),
                requested: Amount::new(30, Currency::USD),
            })
        );
    }

    #[test]
    fn requested_currency_must_match_holdings() {
        let (bank, alice) = (party("Bank", 1), party("Alice", 2));
        let inputs = vec![held(20, &bank, &alice)];
        let flow = TransferCash::new([], party("Bob", 3), Amount::new(10, Currency::EUR));
        assert!(matches!(
            flow.outputs(&alice, &inputs),
            Err(FlowError::Domain(DomainError::CurrencyMismatch { .. }))
        ));
    }
}
