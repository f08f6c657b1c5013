//! `swaptrace quote`

use amm::AmountVector;
use anyhow::{bail, Result};
use swaptrace_core::{Address, Amount};

use crate::scenario::Scenario;

/// Which end of the path is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteAmount {
    In(Amount),
    Out(Amount),
}

impl QuoteAmount {
    pub fn from_args(amount_in: Option<Amount>, amount_out: Option<Amount>) -> Result<Self> {
        match (amount_in, amount_out) {
            (Some(amount), None) => Ok(Self::In(amount)),
            (None, Some(amount)) => Ok(Self::Out(amount)),
            _ => bail!("Exactly one of --amount-in / --amount-out is required"),
        }
    }
}

/// Quote against the scenario's starting ledger
pub fn run(scenario: &Scenario, path: &[Address], amount: QuoteAmount) -> Result<AmountVector> {
    let router = scenario.router()?;
    let ledger = scenario.build_ledger()?;

    let amounts = match amount {
        QuoteAmount::In(amount_in) => router.get_amounts_out(&ledger, amount_in, path)?,
        QuoteAmount::Out(amount_out) => router.get_amounts_in(&ledger, amount_out, path)?,
    };
    tracing::debug!("Quoted {:?}: {:?}", amount, amounts.as_slice());
    Ok(amounts)
}

/// Amounts as decimal strings, matching trade record rendering
pub fn render(amounts: &AmountVector) -> String {
    let values: Vec<String> = amounts.as_slice().iter().map(|a| a.to_string()).collect();
    serde_json::Value::from(values).to_string()
}
