//! In-Memory Ledger
//!
//! A self-contained [`Host`]: token and native balances, a wrapped native
//! token, per-token transfer taxes and constant-product pairs. Used to replay
//! scenarios and to exercise the router without a chain.
//!
//! Pairs follow the usual pair contract rules: the input is whatever the pair
//! holds above its recorded reserve, the fee-adjusted product of balances may
//! not drop below the product of reserves, and reserves sync to balances
//! after every swap.

use std::collections::HashMap;

use num_bigint::BigInt;
use swaptrace_core::constants::BPS_DENOMINATOR;
use swaptrace_core::{Address, Amount, FeeConfig, LedgerError, RouterConfig, Timestamp};

use crate::host::{Host, NativeLedger, PairBackend, TokenLedger};
use crate::pair::PairLocator;
use crate::state::{Pair, RouterError, TradeRecord};

#[derive(Debug, Clone, Copy)]
struct PairState {
    token0: Address,
    token1: Address,
    reserve0: Amount,
    reserve1: Amount,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    /// (token, owner) -> balance
    balances: HashMap<(Address, Address), Amount>,
    native: HashMap<Address, Amount>,
    pairs: HashMap<Address, PairState>,
    events: Vec<TradeRecord>,
    timestamp: Timestamp,
}

/// Opaque snapshot of the full ledger state
#[derive(Debug, Clone)]
pub struct LedgerSnapshot(LedgerState);

/// In-memory execution environment
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    locator: PairLocator,
    wrapped_native: Address,
    fee: FeeConfig,
    /// token -> tax in basis points, charged on every transfer
    transfer_fees: HashMap<Address, u128>,
    state: LedgerState,
}

impl MemoryLedger {
    pub fn new(locator: PairLocator, wrapped_native: Address, fee: FeeConfig) -> Self {
        Self {
            locator,
            wrapped_native,
            fee,
            transfer_fees: HashMap::new(),
            state: LedgerState::default(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> swaptrace_core::Result<Self> {
        Ok(Self::new(
            PairLocator::from_config(config)?,
            config.wrapped_native,
            config.fee,
        ))
    }

    pub fn wrapped_native(&self) -> &Address {
        &self.wrapped_native
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.state.timestamp = timestamp;
    }

    /// Tax every transfer of `token` by `bps` basis points (burned)
    pub fn set_transfer_fee(&mut self, token: Address, bps: u128) {
        if bps == 0 {
            self.transfer_fees.remove(&token);
        } else {
            self.transfer_fees.insert(token, bps.min(BPS_DENOMINATOR));
        }
    }

    pub fn mint(
        &mut self,
        token: &Address,
        owner: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.credit(token, owner, amount)
    }

    pub fn mint_native(&mut self, owner: &Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.state.native.entry(*owner).or_default();
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Create a pair seeded with the given reserves
    pub fn create_pair(
        &mut self,
        token_a: &Address,
        token_b: &Address,
        reserve_a: Amount,
        reserve_b: Amount,
    ) -> Result<Pair, RouterError> {
        let pair = self.locator.locate(token_a, token_b)?;
        if self.state.pairs.contains_key(&pair.address) {
            return Err(LedgerError::PairExists { pair: pair.address }.into());
        }

        let (reserve0, reserve1) = if *token_a == pair.token0 {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        // Both reserves land or neither does
        let held = |ledger: &Self, token: &Address| {
            ledger
                .state
                .balances
                .get(&(*token, pair.address))
                .copied()
                .unwrap_or_default()
        };
        let balance0 = held(self, &pair.token0)
            .checked_add(reserve0)
            .ok_or(LedgerError::Overflow)?;
        let balance1 = held(self, &pair.token1)
            .checked_add(reserve1)
            .ok_or(LedgerError::Overflow)?;
        self.state.balances.insert((pair.token0, pair.address), balance0);
        self.state.balances.insert((pair.token1, pair.address), balance1);
        self.state.pairs.insert(
            pair.address,
            PairState {
                token0: pair.token0,
                token1: pair.token1,
                reserve0,
                reserve1,
            },
        );

        tracing::debug!(
            "Created pair {} ({} / {}) with reserves {} / {}",
            pair.address,
            pair.token0,
            pair.token1,
            reserve0,
            reserve1
        );
        Ok(pair)
    }

    /// Records emitted so far, oldest first
    pub fn events(&self) -> &[TradeRecord] {
        &self.state.events
    }

    fn balance_mut(&mut self, token: &Address, owner: &Address) -> &mut Amount {
        self.state.balances.entry((*token, *owner)).or_default()
    }

    fn debit(
        &mut self,
        token: &Address,
        owner: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, owner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: *token,
                owner: *owner,
                required: amount,
                available,
            });
        }
        *self.balance_mut(token, owner) = available - amount;
        Ok(())
    }

    fn credit(
        &mut self,
        token: &Address,
        owner: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let balance = self.balance_mut(token, owner);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Fee-adjusted `k` check, in big integers so products of large reserves
    /// cannot overflow
    fn check_invariant(
        &self,
        pair: &Address,
        state: &PairState,
        balances: (Amount, Amount),
        inputs: (Amount, Amount),
    ) -> Result<(), LedgerError> {
        let denom = BigInt::from(self.fee.denominator);
        let fee_part = BigInt::from(self.fee.denominator.saturating_sub(self.fee.numerator));

        let adjusted0 = BigInt::from(balances.0) * &denom - BigInt::from(inputs.0) * &fee_part;
        let adjusted1 = BigInt::from(balances.1) * &denom - BigInt::from(inputs.1) * &fee_part;
        let k_before =
            BigInt::from(state.reserve0) * BigInt::from(state.reserve1) * &denom * &denom;

        if adjusted0 * adjusted1 < k_before {
            return Err(LedgerError::InvariantViolated { pair: *pair });
        }
        Ok(())
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        self.state
            .balances
            .get(&(*token, *owner))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let tax = match self.transfer_fees.get(token) {
            Some(bps) => amount.checked_mul(*bps).ok_or(LedgerError::Overflow)? / BPS_DENOMINATOR,
            None => 0,
        };
        self.debit(token, from, amount)?;
        self.credit(token, to, amount - tax)?;
        if tax > 0 {
            tracing::debug!("Transfer of {} {} taxed {}", amount, token, tax);
        }
        Ok(())
    }
}

impl NativeLedger for MemoryLedger {
    fn native_balance(&self, owner: &Address) -> Amount {
        self.state.native.get(owner).copied().unwrap_or(0)
    }

    fn transfer_native(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.native_balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientNativeBalance {
                owner: *from,
                required: amount,
                available,
            });
        }
        self.state.native.insert(*from, available - amount);
        let balance = self.state.native.entry(*to).or_default();
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn deposit(
        &mut self,
        wrapped: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if *wrapped != self.wrapped_native {
            return Err(LedgerError::NotWrappedNative { token: *wrapped });
        }
        let available = self.native_balance(holder);
        if available < amount {
            return Err(LedgerError::InsufficientNativeBalance {
                owner: *holder,
                required: amount,
                available,
            });
        }
        self.state.native.insert(*holder, available - amount);
        self.credit(wrapped, holder, amount)
    }

    fn withdraw(
        &mut self,
        wrapped: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if *wrapped != self.wrapped_native {
            return Err(LedgerError::NotWrappedNative { token: *wrapped });
        }
        self.debit(wrapped, holder, amount)?;
        let balance = self.state.native.entry(*holder).or_default();
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}

impl PairBackend for MemoryLedger {
    fn reserves(&self, pair: &Address) -> Result<(Amount, Amount), LedgerError> {
        self.state
            .pairs
            .get(pair)
            .map(|p| (p.reserve0, p.reserve1))
            .ok_or(LedgerError::PairNotFound { pair: *pair })
    }

    fn swap(
        &mut self,
        pair: &Address,
        amount0_out: Amount,
        amount1_out: Amount,
        to: &Address,
    ) -> Result<(), LedgerError> {
        let state = *self
            .state
            .pairs
            .get(pair)
            .ok_or(LedgerError::PairNotFound { pair: *pair })?;

        if amount0_out == 0 && amount1_out == 0 {
            return Err(LedgerError::InsufficientOutputAmount { pair: *pair });
        }
        if amount0_out >= state.reserve0 || amount1_out >= state.reserve1 {
            return Err(LedgerError::InsufficientLiquidity { pair: *pair });
        }
        if *to == state.token0 || *to == state.token1 {
            return Err(LedgerError::InvalidRecipient { to: *to });
        }

        if amount0_out > 0 {
            self.transfer(&state.token0, pair, to, amount0_out)?;
        }
        if amount1_out > 0 {
            self.transfer(&state.token1, pair, to, amount1_out)?;
        }

        let balance0 = self.balance_of(&state.token0, pair);
        let balance1 = self.balance_of(&state.token1, pair);
        let amount0_in = balance0.saturating_sub(state.reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(state.reserve1 - amount1_out);
        if amount0_in == 0 && amount1_in == 0 {
            return Err(LedgerError::InsufficientInputAmount { pair: *pair });
        }

        self.check_invariant(pair, &state, (balance0, balance1), (amount0_in, amount1_in))?;

        if let Some(p) = self.state.pairs.get_mut(pair) {
            p.reserve0 = balance0;
            p.reserve1 = balance1;
        }
        Ok(())
    }
}

impl Host for MemoryLedger {
    type Checkpoint = LedgerSnapshot;

    fn timestamp(&self) -> Timestamp {
        self.state.timestamp
    }

    fn checkpoint(&self) -> LedgerSnapshot {
        LedgerSnapshot(self.state.clone())
    }

    fn revert_to(&mut self, checkpoint: LedgerSnapshot) {
        self.state = checkpoint.0;
    }

    fn emit(&mut self, record: TradeRecord) {
        self.state.events.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fee, locator, token, user, WETH};

    fn ledger() -> MemoryLedger {
        MemoryLedger::new(locator(), WETH, fee())
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = ledger();
        ledger.mint(&token(1), &user(1), 100).unwrap();
        ledger.transfer(&token(1), &user(1), &user(2), 40).unwrap();
        assert_eq!(ledger.balance_of(&token(1), &user(1)), 60);
        assert_eq!(ledger.balance_of(&token(1), &user(2)), 40);
    }

    #[test]
    fn test_mint_overflow_rejected() {
        let mut ledger = ledger();
        ledger.mint(&token(1), &user(1), u128::MAX).unwrap();
        let err = ledger.mint(&token(1), &user(1), 1).unwrap_err();
        assert_eq!(err.error_code(), "overflow");
        assert_eq!(ledger.balance_of(&token(1), &user(1)), u128::MAX);

        ledger.mint_native(&user(1), u128::MAX).unwrap();
        assert!(matches!(
            ledger.mint_native(&user(1), 1),
            Err(LedgerError::Overflow)
        ));
        assert_eq!(ledger.native_balance(&user(1)), u128::MAX);
    }

    #[test]
    fn test_create_pair_reserve_overflow_leaves_no_pair() {
        let mut ledger = ledger();
        let pair = locator().locate(&token(1), &token(2)).unwrap();
        ledger.mint(&pair.token1, &pair.address, u128::MAX).unwrap();

        let err = ledger.create_pair(&token(1), &token(2), 10, 10).unwrap_err();
        assert_eq!(err.error_code(), "overflow");
        assert_eq!(ledger.balance_of(&pair.token0, &pair.address), 0);
        assert!(ledger.reserves(&pair.address).is_err());
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = ledger();
        ledger.mint(&token(1), &user(1), 10).unwrap();
        let err = ledger
            .transfer(&token(1), &user(1), &user(2), 11)
            .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
        assert_eq!(ledger.balance_of(&token(1), &user(1)), 10);
    }

    #[test]
    fn test_transfer_fee_burned_on_receipt() {
        let mut ledger = ledger();
        ledger.set_transfer_fee(token(1), 200);
        ledger.mint(&token(1), &user(1), 1000).unwrap();
        ledger.transfer(&token(1), &user(1), &user(2), 1000).unwrap();
        assert_eq!(ledger.balance_of(&token(1), &user(1)), 0);
        assert_eq!(ledger.balance_of(&token(1), &user(2)), 980);
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut ledger = ledger();
        ledger.mint_native(&user(1), 500).unwrap();
        ledger.deposit(&WETH, &user(1), 200).unwrap();
        assert_eq!(ledger.native_balance(&user(1)), 300);
        assert_eq!(ledger.balance_of(&WETH, &user(1)), 200);

        ledger.withdraw(&WETH, &user(1), 50).unwrap();
        assert_eq!(ledger.native_balance(&user(1)), 350);
        assert_eq!(ledger.balance_of(&WETH, &user(1)), 150);

        assert!(matches!(
            ledger.deposit(&token(1), &user(1), 1),
            Err(LedgerError::NotWrappedNative { .. })
        ));
        assert!(matches!(
            ledger.deposit(&WETH, &user(1), 10_000),
            Err(LedgerError::InsufficientNativeBalance { .. })
        ));
    }

    #[test]
    fn test_create_pair_orients_reserves() {
        let mut ledger = ledger();
        let pair = ledger
            .create_pair(&token(2), &token(1), 700, 100)
            .unwrap();
        assert_eq!(pair.token0, token(1));
        assert_eq!(ledger.reserves(&pair.address).unwrap(), (100, 700));
        assert_eq!(ledger.balance_of(&token(2), &pair.address), 700);

        let err = ledger.create_pair(&token(1), &token(2), 1, 1).unwrap_err();
        assert_eq!(err.error_code(), "pool_rejected");
    }

    #[test]
    fn test_swap_syncs_reserves() {
        let mut ledger = ledger();
        let pair = ledger
            .create_pair(&token(1), &token(2), 1_000_000, 2_000_000)
            .unwrap();
        ledger.mint(&token(1), &user(1), 1000).unwrap();
        ledger
            .transfer(&token(1), &user(1), &pair.address, 1000)
            .unwrap();

        ledger.swap(&pair.address, 0, 1992, &user(2)).unwrap();

        assert_eq!(ledger.balance_of(&token(2), &user(2)), 1992);
        assert_eq!(
            ledger.reserves(&pair.address).unwrap(),
            (1_001_000, 2_000_000 - 1992)
        );
    }

    #[test]
    fn test_swap_rejects_k_violation() {
        let mut ledger = ledger();
        let pair = ledger
            .create_pair(&token(1), &token(2), 1_000_000, 2_000_000)
            .unwrap();
        ledger.mint(&token(1), &user(1), 1000).unwrap();
        ledger
            .transfer(&token(1), &user(1), &pair.address, 1000)
            .unwrap();

        // One unit more than the fee-adjusted quote
        let err = ledger.swap(&pair.address, 0, 1993, &user(2)).unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolated { .. }));
    }

    #[test]
    fn test_swap_without_input() {
        let mut ledger = ledger();
        let pair = ledger
            .create_pair(&token(1), &token(2), 1_000_000, 2_000_000)
            .unwrap();
        let err = ledger.swap(&pair.address, 0, 10, &user(2)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientInputAmount { .. }));
        assert!(matches!(
            ledger.swap(&pair.address, 0, 2_000_000, &user(2)),
            Err(LedgerError::InsufficientLiquidity { .. })
        ));
        assert!(matches!(
            ledger.swap(&pair.address, 0, 1, &token(1)),
            Err(LedgerError::InvalidRecipient { .. })
        ));
    }

    #[test]
    fn test_checkpoint_restores_everything() {
        let mut ledger = ledger();
        ledger.mint(&token(1), &user(1), 100).unwrap();
        let checkpoint = ledger.checkpoint();

        ledger.transfer(&token(1), &user(1), &user(2), 100).unwrap();
        ledger.mint_native(&user(1), 5).unwrap();
        ledger.revert_to(checkpoint);

        assert_eq!(ledger.balance_of(&token(1), &user(1)), 100);
        assert_eq!(ledger.balance_of(&token(1), &user(2)), 0);
        assert_eq!(ledger.native_balance(&user(1)), 0);
    }
}
