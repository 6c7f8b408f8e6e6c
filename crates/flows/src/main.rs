//! Runs issue → transfer → partial transfer → destroy on an in-memory network
//! and prints the resulting vault.

use anyhow::Context;

use bankcash_core::{Amount, LinearState, Party, PublicKey};
use bankcash_flows::{
    DestroyCash, FlowConfig, FlowContext, InMemoryLedger, IssueCash, TransferCash,
};

fn party(name: &str, byte: u8) -> Party {
    Party::new(name, PublicKey::from_bytes([byte; 32]))
}

fn main() -> anyhow::Result<()> {
    let config = FlowConfig::from_env()?;
    bankcash_observability::init_with(config.log_format);

    let notary = party("Notary", 0xA0);
    let bank = party("Bank", 0x01);
    let alice = party("Alice", 0x02);
    let bob = party("Bob", 0x03);

    let ledger = InMemoryLedger::new();
    ledger.register_notary(notary)?;
    for p in [&bank, &alice, &bob] {
        ledger.register_party(p.clone())?;
    }

    let currency = config.default_currency;
    let hundred = Amount::from_major(100, currency)?;
    let thirty = Amount::from_major(30, currency)?;

    let issued = FlowContext::new(&ledger, bank.clone(), &config).run(&IssueCash::new(hundred))?;
    let position = issued
        .outputs()
        .first()
        .map(|s| s.linear_id())
        .context("issuance produced no output")?;

    FlowContext::new(&ledger, bank.clone(), &config).run(&TransferCash::new(
        [position],
        alice.clone(),
        hundred,
    ))?;

    let split = FlowContext::new(&ledger, alice.clone(), &config).run(&TransferCash::new(
        [position],
        bob.clone(),
        thirty,
    ))?;
    let payment = split
        .outputs()
        .into_iter()
        .find(|s| s.owner() == &bob)
        .map(|s| s.linear_id())
        .context("partial transfer produced no payment")?;

    FlowContext::new(&ledger, bob.clone(), &config).run(&DestroyCash::new([payment]))?;

    tracing::info!(
        transactions = ledger.transactions()?.len(),
        "simulation finished"
    );
    let vault = ledger.unconsumed()?;
    println!("{}", serde_json::to_string_pretty(&vault)?);
    Ok(())
}
