//! Trade Recorder
//!
//! Decides the authoritative amounts of a top-level swap and emits exactly one
//! [`TradeRecord`] for it.
//!
//! Computed amounts are trusted when no transfer tax can interfere. For
//! fee-on-transfer variants the output is measured instead: snapshot the
//! recipient's balance, execute, then diff.

use swaptrace_core::{Address, Amount, RouterConfig};

use crate::host::{Host, NativeLedger, TokenLedger};
use crate::state::{AmountVector, Path, TradeRecord};

/// Balance a snapshot observes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Token(Address),
    Native,
}

/// First phase of a measured trade: the balance before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    asset: Asset,
    owner: Address,
    before: Amount,
}

impl BalanceSnapshot {
    pub fn take<H: TokenLedger + NativeLedger + ?Sized>(
        host: &H,
        asset: Asset,
        owner: &Address,
    ) -> Self {
        Self {
            asset,
            owner: *owner,
            before: read(host, asset, owner),
        }
    }

    pub fn before(&self) -> Amount {
        self.before
    }

    /// Amount gained since the snapshot (zero if the balance fell)
    pub fn diff<H: TokenLedger + NativeLedger + ?Sized>(&self, host: &H) -> Amount {
        read(host, self.asset, &self.owner).saturating_sub(self.before)
    }
}

fn read<H: TokenLedger + NativeLedger + ?Sized>(host: &H, asset: Asset, owner: &Address) -> Amount {
    match asset {
        Asset::Token(token) => host.balance_of(&token, owner),
        Asset::Native => host.native_balance(owner),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecorder {
    platform: String,
    contract: Address,
}

impl TradeRecorder {
    pub fn new(platform: impl Into<String>, contract: Address) -> Self {
        Self {
            platform: platform.into(),
            contract,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.platform.clone(), config.router_address)
    }

    fn record(
        &self,
        path: &Path,
        initiator: &Address,
        amount_in: Amount,
        amount_out: Amount,
    ) -> TradeRecord {
        TradeRecord {
            platform: self.platform.clone(),
            contract_address: self.contract,
            token_in: *path.first(),
            token_out: *path.last(),
            amount_in,
            amount_out,
            initiator: *initiator,
        }
    }

    /// Exact input: the supplied amount as given, the computed final output
    pub fn exact_input(
        &self,
        path: &Path,
        initiator: &Address,
        supplied: Amount,
        amounts: &AmountVector,
    ) -> TradeRecord {
        self.record(path, initiator, supplied, amounts.last())
    }

    /// Exact output: the computed first input, the requested output
    pub fn exact_output(
        &self,
        path: &Path,
        initiator: &Address,
        amounts: &AmountVector,
        requested: Amount,
    ) -> TradeRecord {
        self.record(path, initiator, amounts.first(), requested)
    }

    /// Fee-on-transfer: the supplied amount and the measured delta
    pub fn measured(
        &self,
        path: &Path,
        initiator: &Address,
        supplied: Amount,
        delta: Amount,
    ) -> TradeRecord {
        self.record(path, initiator, supplied, delta)
    }

    pub fn emit<H: Host + ?Sized>(&self, host: &mut H, record: TradeRecord) {
        tracing::info!("Trade recorded: {}", record);
        host.emit(record);
    }
}
