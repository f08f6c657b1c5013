//! Scenario files
//!
//! A scenario describes a starting ledger (pairs, balances, taxed tokens, block
//! time) and an ordered list of router calls to run against it.

use std::path::Path;

use amm::{MemoryLedger, Router, SwapCall};
use anyhow::{Context, Result};
use serde::Deserialize;
use swaptrace_core::{amount_string, Address, Amount, RouterConfig, Timestamp};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub address: Address,
    /// Transfer tax in basis points
    #[serde(default, with = "amount_string")]
    pub transfer_fee_bps: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairEntry {
    pub token_a: Address,
    pub token_b: Address,
    #[serde(with = "amount_string")]
    pub reserve_a: Amount,
    #[serde(with = "amount_string")]
    pub reserve_b: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEntry {
    pub token: Address,
    pub owner: Address,
    #[serde(with = "amount_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeBalanceEntry {
    pub owner: Address,
    #[serde(with = "amount_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioCall {
    pub caller: Address,
    pub call: SwapCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: RouterConfig,
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
    #[serde(default)]
    pub pairs: Vec<PairEntry>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
    #[serde(default)]
    pub native_balances: Vec<NativeBalanceEntry>,
    #[serde(default)]
    pub calls: Vec<ScenarioCall>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid scenario JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("In {}", path.display()))
    }

    pub fn router(&self) -> Result<Router> {
        Router::new(self.config.clone()).context("Invalid router config")
    }

    /// Build the starting ledger
    pub fn build_ledger(&self) -> Result<MemoryLedger> {
        let mut ledger = MemoryLedger::from_config(&self.config)?;
        ledger.set_timestamp(self.timestamp);

        for token in &self.tokens {
            ledger.set_transfer_fee(token.address, token.transfer_fee_bps);
        }
        for pair in &self.pairs {
            ledger
                .create_pair(&pair.token_a, &pair.token_b, pair.reserve_a, pair.reserve_b)
                .with_context(|| format!("Cannot create pair {} / {}", pair.token_a, pair.token_b))?;
        }
        for balance in &self.balances {
            ledger
                .mint(&balance.token, &balance.owner, balance.amount)
                .with_context(|| format!("Cannot fund {} with {}", balance.owner, balance.token))?;
        }
        for balance in &self.native_balances {
            ledger
                .mint_native(&balance.owner, balance.amount)
                .with_context(|| format!("Cannot fund {} with native", balance.owner))?;
        }

        tracing::debug!(
            "Scenario ledger ready: {} pairs, {} balances, {} calls",
            self.pairs.len(),
            self.balances.len() + self.native_balances.len(),
            self.calls.len()
        );
        Ok(ledger)
    }
}
