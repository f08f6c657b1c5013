//! Constant-Product Router
//!
//! This crate routes exact-input and exact-output swaps through chains of
//! constant-product pairs and produces one accurate trade record per call,
//! including for tokens that tax their own transfers.

pub mod calculator;
pub mod executor;
pub mod host;
pub mod ledger;
pub mod native;
pub mod pair;
pub mod recorder;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use calculator::{get_amount_in, get_amount_out, get_amounts_in, get_amounts_out};
pub use executor::{ExecutionState, Funding, PathExecutor};
pub use host::{Host, NativeLedger, PairBackend, TokenLedger};
pub use ledger::{LedgerSnapshot, MemoryLedger};
pub use native::{NativeAdapter, NativeLeg};
pub use pair::{sort_tokens, PairLocator};
pub use recorder::{Asset, BalanceSnapshot, TradeRecorder};
pub use router::Router;
pub use state::{
    AmountVector, Pair, Path, RouterError, SwapCall, SwapKind, SwapOutcome, TradeRecord,
};
