//! Host capabilities
//!
//! The router never owns balances or pool state. Everything it touches goes
//! through these traits, implemented by whatever execution environment hosts
//! it (an EVM fork, a simulator, or [`MemoryLedger`](crate::ledger::MemoryLedger)).

use swaptrace_core::{Address, Amount, LedgerError, Timestamp};

use crate::state::TradeRecord;

/// Pool primitive: reserve reads and the low-level swap.
pub trait PairBackend {
    /// Canonical `(reserve0, reserve1)` of a pair
    fn reserves(&self, pair: &Address) -> Result<(Amount, Amount), LedgerError>;

    /// Release `amount0_out` of token0 and `amount1_out` of token1 to `to`.
    ///
    /// The pool must already hold the input; it infers the input from its
    /// balance over its recorded reserve.
    fn swap(
        &mut self,
        pair: &Address,
        amount0_out: Amount,
        amount1_out: Amount,
        to: &Address,
    ) -> Result<(), LedgerError>;
}

/// Fungible token balances and transfers.
pub trait TokenLedger {
    fn balance_of(&self, token: &Address, owner: &Address) -> Amount;

    /// Move `amount` from `from` to `to`. The recipient may be credited less
    /// than `amount` if the token taxes transfers.
    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Native currency and its wrapped token.
pub trait NativeLedger {
    fn native_balance(&self, owner: &Address) -> Amount;

    fn transfer_native(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Convert `amount` of `holder`'s native currency into `wrapped` tokens
    fn deposit(&mut self, wrapped: &Address, holder: &Address, amount: Amount)
        -> Result<(), LedgerError>;

    /// Convert `amount` of `holder`'s `wrapped` tokens back into native currency
    fn withdraw(
        &mut self,
        wrapped: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// Full execution environment of one router call.
///
/// `checkpoint`/`revert_to` give the all-or-nothing guarantee: the router
/// takes a checkpoint before touching state and reverts to it on failure.
pub trait Host: PairBackend + TokenLedger + NativeLedger {
    type Checkpoint;

    /// Current block timestamp
    fn timestamp(&self) -> Timestamp;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn revert_to(&mut self, checkpoint: Self::Checkpoint);

    /// Publish a trade record (reverted together with the rest of the call)
    fn emit(&mut self, record: TradeRecord);
}
