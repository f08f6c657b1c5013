//! Router: Swap Entry Points & Dispatch
//!
//! Nine entry variants over {exact input, exact output} x {token/token,
//! native/token, token/native} plus fee-on-transfer-safe exact-input
//! variants. Every entry checks its deadline, validates the path, quotes,
//! enforces its slippage bound, executes, and emits one trade record.
//!
//! Each call is atomic: the host is checkpointed after the deadline check and
//! reverted on any failure, so a failed call leaves no transfers and no
//! record behind.

use swaptrace_core::{Address, Amount, RouterConfig, Timestamp};

use crate::calculator;
use crate::executor::{Funding, PathExecutor};
use crate::host::{Host, PairBackend};
use crate::native::{NativeAdapter, NativeLeg};
use crate::pair::PairLocator;
use crate::recorder::{Asset, BalanceSnapshot, TradeRecorder};
use crate::state::{AmountVector, Path, RouterError, SwapCall, SwapKind, SwapOutcome, TradeRecord};

/// Constant-product router bound to one factory and one wrapped native token.
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    locator: PairLocator,
    native: NativeAdapter,
    recorder: TradeRecorder,
}

fn ensure_min_output(got: Amount, min: Amount) -> Result<(), RouterError> {
    if got < min {
        return Err(RouterError::InsufficientOutputAmount { got, min });
    }
    Ok(())
}

fn ensure_max_input(required: Amount, max: Amount) -> Result<(), RouterError> {
    if required > max {
        return Err(RouterError::ExcessiveInputAmount { required, max });
    }
    Ok(())
}

impl Router {
    pub fn new(config: RouterConfig) -> swaptrace_core::Result<Self> {
        config.validate()?;
        let locator = PairLocator::from_config(&config)?;
        let native = NativeAdapter::new(config.wrapped_native, config.router_address);
        let recorder = TradeRecorder::from_config(&config);
        Ok(Self {
            config,
            locator,
            native,
            recorder,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn locator(&self) -> &PairLocator {
        &self.locator
    }

    /// Address the router executes as
    pub fn address(&self) -> &Address {
        &self.config.router_address
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    pub fn get_amounts_out<B: PairBackend + ?Sized>(
        &self,
        backend: &B,
        amount_in: Amount,
        path: &[Address],
    ) -> Result<AmountVector, RouterError> {
        let path = Path::from_slice(path)?;
        calculator::get_amounts_out(&self.locator, backend, self.config.fee, amount_in, &path)
    }

    pub fn get_amounts_in<B: PairBackend + ?Sized>(
        &self,
        backend: &B,
        amount_out: Amount,
        path: &[Address],
    ) -> Result<AmountVector, RouterError> {
        let path = Path::from_slice(path)?;
        calculator::get_amounts_in(&self.locator, backend, self.config.fee, amount_out, &path)
    }

    fn quote_out<B: PairBackend + ?Sized>(
        &self,
        backend: &B,
        amount_in: Amount,
        path: &Path,
    ) -> Result<AmountVector, RouterError> {
        calculator::get_amounts_out(&self.locator, backend, self.config.fee, amount_in, path)
    }

    fn quote_in<B: PairBackend + ?Sized>(
        &self,
        backend: &B,
        amount_out: Amount,
        path: &Path,
    ) -> Result<AmountVector, RouterError> {
        calculator::get_amounts_in(&self.locator, backend, self.config.fee, amount_out, path)
    }

    // -----------------------------------------------------------------------
    // Transaction plumbing
    // -----------------------------------------------------------------------

    fn executor(&self) -> PathExecutor<'_> {
        PathExecutor::new(&self.locator, self.config.fee)
    }

    /// Run `body` as one all-or-nothing call
    fn transact<H, F>(
        &self,
        host: &mut H,
        kind: SwapKind,
        deadline: Timestamp,
        body: F,
    ) -> Result<SwapOutcome, RouterError>
    where
        H: Host + ?Sized,
        F: FnOnce(&mut H) -> Result<SwapOutcome, RouterError>,
    {
        let now = host.timestamp();
        if deadline < now {
            tracing::warn!("{} expired: deadline {} < now {}", kind, deadline, now);
            return Err(RouterError::Expired { deadline, now });
        }

        let checkpoint = host.checkpoint();
        match body(host) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                host.revert_to(checkpoint);
                tracing::warn!("{} reverted: {}", kind, err);
                Err(err)
            }
        }
    }

    fn settle<H: Host + ?Sized>(
        &self,
        host: &mut H,
        amounts: Option<AmountVector>,
        record: TradeRecord,
    ) -> SwapOutcome {
        self.recorder.emit(host, record.clone());
        SwapOutcome { amounts, record }
    }

    // -----------------------------------------------------------------------
    // Token -> token
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::ExactTokensForTokens, deadline, |host| {
            let path = Path::from_slice(path)?;
            let amounts = self.quote_out(&*host, amount_in, &path)?;
            ensure_min_output(amounts.last(), amount_out_min)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, to)?;

            let record = self.recorder.exact_input(&path, caller, amount_in, &amounts);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn swap_tokens_for_exact_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::TokensForExactTokens, deadline, |host| {
            let path = Path::from_slice(path)?;
            let amounts = self.quote_in(&*host, amount_out, &path)?;
            ensure_max_input(amounts.first(), amount_in_max)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, to)?;

            let record = self.recorder.exact_output(&path, caller, &amounts, amount_out);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    // -----------------------------------------------------------------------
    // Native -> token
    // -----------------------------------------------------------------------

    /// `value` is the native amount attached to the call
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_eth_for_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        value: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::ExactEthForTokens, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Input)?;
            let amounts = self.quote_out(&*host, value, &path)?;
            ensure_min_output(amounts.last(), amount_out_min)?;

            self.native.collect(host, caller, value)?;
            let mut executor = self.executor();
            executor.fund(host, Funding::Native(&self.native), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, to)?;

            let record = self.recorder.exact_input(&path, caller, value, &amounts);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    /// `value` is the native amount attached to the call and bounds the input;
    /// whatever the path does not consume is refunded to `caller`.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_eth_for_exact_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_out: Amount,
        value: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::EthForExactTokens, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Input)?;
            let amounts = self.quote_in(&*host, amount_out, &path)?;
            ensure_max_input(amounts.first(), value)?;

            self.native.collect(host, caller, value)?;
            let mut executor = self.executor();
            executor.fund(host, Funding::Native(&self.native), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, to)?;
            self.native
                .refund_dust(host, value, amounts.first(), caller)?;

            let record = self.recorder.exact_output(&path, caller, &amounts, amount_out);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    // -----------------------------------------------------------------------
    // Token -> native
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn swap_tokens_for_exact_eth<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::TokensForExactEth, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Output)?;
            let amounts = self.quote_in(&*host, amount_out, &path)?;
            ensure_max_input(amounts.first(), amount_in_max)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, self.address())?;
            self.native.unwrap(host, amounts.last(), to)?;

            let record = self.recorder.exact_output(&path, caller, &amounts, amount_out);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_eth<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        self.transact(host, SwapKind::ExactTokensForEth, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Output)?;
            let amounts = self.quote_out(&*host, amount_in, &path)?;
            ensure_min_output(amounts.last(), amount_out_min)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amounts.first())?;
            executor.execute(host, &path, &amounts, self.address())?;
            self.native.unwrap(host, amounts.last(), to)?;

            let record = self.recorder.exact_input(&path, caller, amount_in, &amounts);
            Ok(self.settle(host, Some(amounts), record))
        })
    }

    // -----------------------------------------------------------------------
    // Fee-on-transfer-safe variants (exact input only)
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens_supporting_fee_on_transfer_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        let kind = SwapKind::ExactTokensForTokensSupportingFeeOnTransfer;
        self.transact(host, kind, deadline, |host| {
            let path = Path::from_slice(path)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amount_in)?;
            let snapshot = BalanceSnapshot::take(&*host, Asset::Token(*path.last()), to);
            executor.execute_supporting_fee_on_transfer(host, &path, to)?;

            let received = snapshot.diff(&*host);
            ensure_min_output(received, amount_out_min)?;

            let record = self.recorder.measured(&path, caller, amount_in, received);
            Ok(self.settle(host, None, record))
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_eth_for_tokens_supporting_fee_on_transfer_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        value: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        let kind = SwapKind::ExactEthForTokensSupportingFeeOnTransfer;
        self.transact(host, kind, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Input)?;

            self.native.collect(host, caller, value)?;
            let mut executor = self.executor();
            executor.fund(host, Funding::Native(&self.native), &path, value)?;
            let snapshot = BalanceSnapshot::take(&*host, Asset::Token(*path.last()), to);
            executor.execute_supporting_fee_on_transfer(host, &path, to)?;

            let received = snapshot.diff(&*host);
            ensure_min_output(received, amount_out_min)?;

            let record = self.recorder.measured(&path, caller, value, received);
            Ok(self.settle(host, None, record))
        })
    }

    /// The bound applies to the wrapped amount the router receives; the record
    /// carries the native amount the recipient actually gained.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: &Address,
        deadline: Timestamp,
    ) -> Result<SwapOutcome, RouterError> {
        let kind = SwapKind::ExactTokensForEthSupportingFeeOnTransfer;
        self.transact(host, kind, deadline, |host| {
            let path = Path::from_slice(path)?;
            self.native.require_wrapped(&path, NativeLeg::Output)?;

            let mut executor = self.executor();
            executor.fund(host, Funding::Payer(caller), &path, amount_in)?;
            let delivered = BalanceSnapshot::take(&*host, Asset::Native, to);
            let wrapped = BalanceSnapshot::take(&*host, Asset::Token(*self.native.wrapped()), self.address());
            executor.execute_supporting_fee_on_transfer(host, &path, self.address())?;

            let amount_out = wrapped.diff(&*host);
            ensure_min_output(amount_out, amount_out_min)?;
            self.native.unwrap(host, amount_out, to)?;

            let record = self
                .recorder
                .measured(&path, caller, amount_in, delivered.diff(&*host));
            Ok(self.settle(host, None, record))
        })
    }

    // -----------------------------------------------------------------------
    // Uniform dispatch
    // -----------------------------------------------------------------------

    /// Route a [`SwapCall`] to its entry variant.
    ///
    /// For native-in variants the attached value is `fixed_amount` (exact
    /// input) or `bound_amount` (exact output).
    pub fn dispatch<H: Host + ?Sized>(
        &self,
        host: &mut H,
        caller: &Address,
        call: &SwapCall,
    ) -> Result<SwapOutcome, RouterError> {
        tracing::debug!(
            "Dispatching {} for {}: fixed {}, bound {}",
            call.kind,
            caller,
            call.fixed_amount,
            call.bound_amount
        );
        let (fixed, bound, path, to, deadline) = (
            call.fixed_amount,
            call.bound_amount,
            call.path.as_slice(),
            &call.to,
            call.deadline,
        );
        match call.kind {
            SwapKind::ExactTokensForTokens => {
                self.swap_exact_tokens_for_tokens(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::TokensForExactTokens => {
                self.swap_tokens_for_exact_tokens(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::ExactEthForTokens => {
                self.swap_exact_eth_for_tokens(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::TokensForExactEth => {
                self.swap_tokens_for_exact_eth(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::ExactTokensForEth => {
                self.swap_exact_tokens_for_eth(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::EthForExactTokens => {
                self.swap_eth_for_exact_tokens(host, caller, fixed, bound, path, to, deadline)
            }
            SwapKind::ExactTokensForTokensSupportingFeeOnTransfer => self
                .swap_exact_tokens_for_tokens_supporting_fee_on_transfer_tokens(
                    host, caller, fixed, bound, path, to, deadline,
                ),
            SwapKind::ExactEthForTokensSupportingFeeOnTransfer => self
                .swap_exact_eth_for_tokens_supporting_fee_on_transfer_tokens(
                    host, caller, fixed, bound, path, to, deadline,
                ),
            SwapKind::ExactTokensForEthSupportingFeeOnTransfer => self
                .swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens(
                    host, caller, fixed, bound, path, to, deadline,
                ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
