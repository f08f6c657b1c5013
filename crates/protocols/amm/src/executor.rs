//! Path Executor
//!
//! Walks a validated path and issues one pair swap per hop. Each hop's output
//! is sent straight to the next hop's pair; the final hop pays the recipient.
//!
//! The executor never undoes a transfer. If a hop fails the execution is
//! marked [`ExecutionState::Reverted`] and the error is returned; rolling the
//! host back is the caller's job.

use swaptrace_core::{Address, Amount, FeeConfig};

use crate::calculator::get_amount_out;
use crate::host::{NativeLedger, PairBackend, TokenLedger};
use crate::native::NativeAdapter;
use crate::pair::PairLocator;
use crate::state::{AmountVector, Path, RouterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Amounts known, nothing transferred yet
    Pending,
    /// Every hop swapped
    Settled,
    /// A transfer or hop failed
    Reverted,
}

/// Where the first hop's input comes from
#[derive(Debug, Clone, Copy)]
pub enum Funding<'a> {
    /// Transfer the first path token from this account
    Payer(&'a Address),
    /// Wrap native currency the router already collected
    Native(&'a NativeAdapter),
}

/// One-shot executor for a single operation
#[derive(Debug)]
pub struct PathExecutor<'a> {
    locator: &'a PairLocator,
    fee: FeeConfig,
    state: ExecutionState,
}

impl<'a> PathExecutor<'a> {
    pub fn new(locator: &'a PairLocator, fee: FeeConfig) -> Self {
        Self {
            locator,
            fee,
            state: ExecutionState::Pending,
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    fn track<T>(&mut self, result: Result<T, RouterError>) -> Result<T, RouterError> {
        if result.is_err() {
            self.state = ExecutionState::Reverted;
        }
        result
    }

    /// Move `amount` of the first path token into the first pair
    pub fn fund<H>(
        &mut self,
        host: &mut H,
        funding: Funding<'_>,
        path: &Path,
        amount: Amount,
    ) -> Result<(), RouterError>
    where
        H: TokenLedger + NativeLedger + ?Sized,
    {
        debug_assert_eq!(self.state, ExecutionState::Pending);
        let result = self.fund_inner(host, funding, path, amount);
        self.track(result)
    }

    fn fund_inner<H>(
        &self,
        host: &mut H,
        funding: Funding<'_>,
        path: &Path,
        amount: Amount,
    ) -> Result<(), RouterError>
    where
        H: TokenLedger + NativeLedger + ?Sized,
    {
        let tokens = path.tokens();
        let first_pair = self.locator.pair_for(&tokens[0], &tokens[1])?;
        match funding {
            Funding::Payer(payer) => {
                host.transfer(&tokens[0], payer, &first_pair, amount)?;
            }
            Funding::Native(adapter) => {
                adapter.wrap(host, amount, &first_pair)?;
            }
        }
        Ok(())
    }

    /// Swap through every hop using precomputed `amounts`
    pub fn execute<H: PairBackend + ?Sized>(
        &mut self,
        host: &mut H,
        path: &Path,
        amounts: &AmountVector,
        to: &Address,
    ) -> Result<(), RouterError> {
        debug_assert_eq!(self.state, ExecutionState::Pending);
        let result = self.execute_inner(host, path, amounts, to);
        self.track(result)?;
        self.state = ExecutionState::Settled;
        Ok(())
    }

    fn execute_inner<H: PairBackend + ?Sized>(
        &self,
        host: &mut H,
        path: &Path,
        amounts: &AmountVector,
        to: &Address,
    ) -> Result<(), RouterError> {
        for (i, (input, output)) in path.hops().enumerate() {
            let pair = self.locator.locate(input, output)?;
            let amount_out = amounts
                .get(i + 1)
                .ok_or_else(|| RouterError::InvalidPath("amount vector shorter than path".into()))?;
            let (amount0_out, amount1_out) = pair.outputs_for(output, amount_out);
            let recipient = self.hop_recipient(path, i, to)?;

            host.swap(&pair.address, amount0_out, amount1_out, &recipient)?;
            tracing::debug!(
                "Hop {}: {} -> {} via {}, out {} to {}",
                i,
                input,
                output,
                pair.address,
                amount_out,
                recipient
            );
        }
        Ok(())
    }

    /// Swap through every hop, deriving each hop's input from what the pair
    /// actually received.
    pub fn execute_supporting_fee_on_transfer<H>(
        &mut self,
        host: &mut H,
        path: &Path,
        to: &Address,
    ) -> Result<(), RouterError>
    where
        H: PairBackend + TokenLedger + ?Sized,
    {
        debug_assert_eq!(self.state, ExecutionState::Pending);
        let result = self.execute_measured(host, path, to);
        self.track(result)?;
        self.state = ExecutionState::Settled;
        Ok(())
    }

    fn execute_measured<H>(&self, host: &mut H, path: &Path, to: &Address) -> Result<(), RouterError>
    where
        H: PairBackend + TokenLedger + ?Sized,
    {
        for (i, (input, output)) in path.hops().enumerate() {
            let pair = self.locator.locate(input, output)?;
            let (reserve_in, reserve_out) = pair.orient(input, host.reserves(&pair.address)?);

            let received = host
                .balance_of(input, &pair.address)
                .saturating_sub(reserve_in);
            let amount_out = get_amount_out(received, reserve_in, reserve_out, self.fee)?;
            let (amount0_out, amount1_out) = pair.outputs_for(output, amount_out);
            let recipient = self.hop_recipient(path, i, to)?;

            host.swap(&pair.address, amount0_out, amount1_out, &recipient)?;
            tracing::debug!(
                "Hop {} (measured): {} {} -> {} {} via {}",
                i,
                received,
                input,
                amount_out,
                output,
                pair.address
            );
        }
        Ok(())
    }

    /// Next hop's pair, or `to` after the final hop
    fn hop_recipient(&self, path: &Path, hop: usize, to: &Address) -> Result<Address, RouterError> {
        let tokens = path.tokens();
        if hop + 2 < tokens.len() {
            self.locator.pair_for(&tokens[hop + 1], &tokens[hop + 2])
        } else {
            Ok(*to)
        }
    }
}
