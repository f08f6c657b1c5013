//! Native Currency Adapter
//!
//! Moves the chain's native currency in and out of its wrapped token at the
//! ends of a path. The router itself is the holder for every intermediate
//! step: attached value is collected to it, wrapped by it, and unwrapped
//! proceeds are paid out from it.

use swaptrace_core::{Address, Amount};

use crate::host::{NativeLedger, TokenLedger};
use crate::state::{Path, RouterError};

/// Which end of a path carries native currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeLeg {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAdapter {
    wrapped: Address,
    router: Address,
}

impl NativeAdapter {
    pub fn new(wrapped: Address, router: Address) -> Self {
        Self { wrapped, router }
    }

    pub fn wrapped(&self) -> &Address {
        &self.wrapped
    }

    /// The native leg of `path` must be the wrapped token
    pub fn require_wrapped(&self, path: &Path, leg: NativeLeg) -> Result<(), RouterError> {
        let token = match leg {
            NativeLeg::Input => path.first(),
            NativeLeg::Output => path.last(),
        };
        if *token != self.wrapped {
            return Err(RouterError::InvalidPath(format!(
                "{:?} leg must be wrapped native {}, got {}",
                leg, self.wrapped, token
            )));
        }
        Ok(())
    }

    /// Take the call's attached native value from `caller`
    pub fn collect<H: NativeLedger + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        value: Amount,
    ) -> Result<(), RouterError> {
        host.transfer_native(caller, &self.router, value)?;
        Ok(())
    }

    /// Wrap `amount` of collected native currency and credit it to `pair`
    pub fn wrap<H: NativeLedger + TokenLedger + ?Sized>(
        &self,
        host: &mut H,
        amount: Amount,
        pair: &Address,
    ) -> Result<(), RouterError> {
        host.deposit(&self.wrapped, &self.router, amount)?;
        host.transfer(&self.wrapped, &self.router, pair, amount)?;
        tracing::debug!("Wrapped {} native into pair {}", amount, pair);
        Ok(())
    }

    /// Unwrap `amount` of wrapped token held by the router and pay `recipient`
    pub fn unwrap<H: NativeLedger + TokenLedger + ?Sized>(
        &self,
        host: &mut H,
        amount: Amount,
        recipient: &Address,
    ) -> Result<(), RouterError> {
        host.withdraw(&self.wrapped, &self.router, amount)?;
        host.transfer_native(&self.router, recipient, amount)?;
        tracing::debug!("Unwrapped {} native to {}", amount, recipient);
        Ok(())
    }

    /// Return `sent - consumed` to `caller`. Returns the refunded amount.
    pub fn refund_dust<H: NativeLedger + ?Sized>(
        &self,
        host: &mut H,
        sent: Amount,
        consumed: Amount,
        caller: &Address,
    ) -> Result<Amount, RouterError> {
        let dust = sent.saturating_sub(consumed);
        if dust > 0 {
            host.transfer_native(&self.router, caller, dust)?;
            tracing::debug!("Refunded {} native dust to {}", dust, caller);
        }
        Ok(dust)
    }
}
