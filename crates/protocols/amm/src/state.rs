//! Router State Types
//!
//! Paths, amount vectors, pairs, trade records, call descriptions and errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use swaptrace_core::{amount_string, Address, Amount, LedgerError, Timestamp};
use thiserror::Error;

/// Validated token path.
///
/// At least two tokens, no two adjacent tokens equal. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<Address>);

impl Path {
    pub fn new(tokens: Vec<Address>) -> Result<Self, RouterError> {
        if tokens.len() < 2 {
            return Err(RouterError::InvalidPath(format!(
                "path needs at least 2 tokens, got {}",
                tokens.len()
            )));
        }
        if let Some(pos) = tokens.windows(2).position(|w| w[0] == w[1]) {
            return Err(RouterError::InvalidPath(format!(
                "adjacent duplicate {} at position {}",
                tokens[pos], pos
            )));
        }
        Ok(Self(tokens))
    }

    pub fn from_slice(tokens: &[Address]) -> Result<Self, RouterError> {
        Self::new(tokens.to_vec())
    }

    pub fn first(&self) -> &Address {
        &self.0[0]
    }

    pub fn last(&self) -> &Address {
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a valid path has at least two tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pools traversed
    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// `(token_in, token_out)` for each hop, in order
    pub fn hops(&self) -> impl Iterator<Item = (&Address, &Address)> {
        self.0.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn tokens(&self) -> &[Address] {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", joined.join(" -> "))
    }
}

/// Per-hop amounts for one operation; same length as its path.
///
/// `amounts[0]` enters hop 0, `amounts[i]` leaves hop `i-1` and enters hop
/// `i`, the last element leaves the final hop. Every element is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AmountVector(Vec<Amount>);

impl AmountVector {
    pub(crate) fn from_vec(amounts: Vec<Amount>) -> Self {
        Self(amounts)
    }

    pub fn first(&self) -> Amount {
        self.0[0]
    }

    pub fn last(&self) -> Amount {
        self.0[self.0.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<Amount> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Amount] {
        &self.0
    }
}

/// A located pair: derived address plus its canonical token orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub address: Address,
    /// Lower token address
    pub token0: Address,
    /// Higher token address
    pub token1: Address,
}

impl Pair {
    /// Orient canonical `(reserve0, reserve1)` to `(reserve_in, reserve_out)`
    pub fn orient(&self, token_in: &Address, reserves: (Amount, Amount)) -> (Amount, Amount) {
        if *token_in == self.token0 {
            reserves
        } else {
            (reserves.1, reserves.0)
        }
    }

    /// `(amount0_out, amount1_out)` for a swap that releases `amount_out` of `token_out`
    pub fn outputs_for(&self, token_out: &Address, amount_out: Amount) -> (Amount, Amount) {
        if *token_out == self.token0 {
            (amount_out, 0)
        } else {
            (0, amount_out)
        }
    }
}

/// Economic record of one top-level swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub platform: String,
    pub contract_address: Address,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "amount_string")]
    pub amount_in: Amount,
    #[serde(with = "amount_string")]
    pub amount_out: Amount,
    pub initiator: Address,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} -> {} {} (by {})",
            self.platform,
            self.amount_in,
            self.token_in,
            self.amount_out,
            self.token_out,
            self.initiator
        )
    }
}

/// Router entry variants, named after their entry methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
    #[serde(rename = "swap_exact_tokens_for_tokens")]
    ExactTokensForTokens,
    #[serde(rename = "swap_tokens_for_exact_tokens")]
    TokensForExactTokens,
    #[serde(rename = "swap_exact_eth_for_tokens")]
    ExactEthForTokens,
    #[serde(rename = "swap_tokens_for_exact_eth")]
    TokensForExactEth,
    #[serde(rename = "swap_exact_tokens_for_eth")]
    ExactTokensForEth,
    #[serde(rename = "swap_eth_for_exact_tokens")]
    EthForExactTokens,
    #[serde(rename = "swap_exact_tokens_for_tokens_supporting_fee_on_transfer_tokens")]
    ExactTokensForTokensSupportingFeeOnTransfer,
    #[serde(rename = "swap_exact_eth_for_tokens_supporting_fee_on_transfer_tokens")]
    ExactEthForTokensSupportingFeeOnTransfer,
    #[serde(rename = "swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens")]
    ExactTokensForEthSupportingFeeOnTransfer,
}

impl SwapKind {
    pub const ALL: [SwapKind; 9] = [
        Self::ExactTokensForTokens,
        Self::TokensForExactTokens,
        Self::ExactEthForTokens,
        Self::TokensForExactEth,
        Self::ExactTokensForEth,
        Self::EthForExactTokens,
        Self::ExactTokensForTokensSupportingFeeOnTransfer,
        Self::ExactEthForTokensSupportingFeeOnTransfer,
        Self::ExactTokensForEthSupportingFeeOnTransfer,
    ];

    pub fn is_exact_input(&self) -> bool {
        !matches!(
            self,
            Self::TokensForExactTokens | Self::TokensForExactEth | Self::EthForExactTokens
        )
    }

    pub fn supports_fee_on_transfer(&self) -> bool {
        matches!(
            self,
            Self::ExactTokensForTokensSupportingFeeOnTransfer
                | Self::ExactEthForTokensSupportingFeeOnTransfer
                | Self::ExactTokensForEthSupportingFeeOnTransfer
        )
    }

    /// Caller pays in native currency
    pub fn native_in(&self) -> bool {
        matches!(
            self,
            Self::ExactEthForTokens
                | Self::EthForExactTokens
                | Self::ExactEthForTokensSupportingFeeOnTransfer
        )
    }

    /// Recipient is paid in native currency
    pub fn native_out(&self) -> bool {
        matches!(
            self,
            Self::TokensForExactEth
                | Self::ExactTokensForEth
                | Self::ExactTokensForEthSupportingFeeOnTransfer
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactTokensForTokens => "swap_exact_tokens_for_tokens",
            Self::TokensForExactTokens => "swap_tokens_for_exact_tokens",
            Self::ExactEthForTokens => "swap_exact_eth_for_tokens",
            Self::TokensForExactEth => "swap_tokens_for_exact_eth",
            Self::ExactTokensForEth => "swap_exact_tokens_for_eth",
            Self::EthForExactTokens => "swap_eth_for_exact_tokens",
            Self::ExactTokensForTokensSupportingFeeOnTransfer => {
                "swap_exact_tokens_for_tokens_supporting_fee_on_transfer_tokens"
            }
            Self::ExactEthForTokensSupportingFeeOnTransfer => {
                "swap_exact_eth_for_tokens_supporting_fee_on_transfer_tokens"
            }
            Self::ExactTokensForEthSupportingFeeOnTransfer => {
                "swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens"
            }
        }
    }
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform description of a router call.
///
/// `fixed_amount` is the exact side (input for exact-input variants, output
/// for exact-output ones); `bound_amount` is the slippage bound on the other
/// side. For native-in calls the attached native value is `fixed_amount`
/// (exact input) or `bound_amount` (exact output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCall {
    pub kind: SwapKind,
    #[serde(with = "amount_string")]
    pub fixed_amount: Amount,
    #[serde(with = "amount_string")]
    pub bound_amount: Amount,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: Timestamp,
}

/// Result of a successful router call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    /// Computed hop amounts; absent for fee-on-transfer variants
    pub amounts: Option<AmountVector>,
    pub record: TradeRecord,
}

/// Router errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Transaction expired: deadline {deadline}, now {now}")]
    Expired { deadline: Timestamp, now: Timestamp },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Identical tokens: {0}")]
    IdenticalTokens(Address),

    #[error("Zero address in pair")]
    ZeroAddress,

    #[error("Pair not found: {0}")]
    PairNotFound(Address),

    #[error("Insufficient liquidity for swap")]
    InsufficientLiquidity,

    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    #[error("Excessive input amount: need {required}, max {max}")]
    ExcessiveInputAmount { required: Amount, max: Amount },

    #[error("Insufficient output amount: got {got}, need {min}")]
    InsufficientOutputAmount { got: Amount, min: Amount },

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Pool rejected swap: {0}")]
    PoolRejected(LedgerError),

    #[error("Arithmetic overflow")]
    Overflow,
}

impl RouterError {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired",
            Self::InvalidPath(_) => "invalid_path",
            Self::IdenticalTokens(_) => "identical_tokens",
            Self::ZeroAddress => "zero_address",
            Self::PairNotFound(_) => "pair_not_found",
            Self::InsufficientLiquidity => "insufficient_liquidity",
            Self::InsufficientInputAmount => "insufficient_input_amount",
            Self::ExcessiveInputAmount { .. } => "excessive_input_amount",
            Self::InsufficientOutputAmount { .. } => "insufficient_output_amount",
            Self::TransferFailed(_) => "transfer_failed",
            Self::PoolRejected(_) => "pool_rejected",
            Self::Overflow => "overflow",
        }
    }
}

impl From<LedgerError> for RouterError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::PairNotFound { pair } => Self::PairNotFound(pair),
            LedgerError::InsufficientLiquidity { .. } => Self::InsufficientLiquidity,
            LedgerError::InsufficientInputAmount { .. } => Self::InsufficientInputAmount,
            LedgerError::Overflow => Self::Overflow,
            e if e.is_transfer_failure() => Self::TransferFailed(e.to_string()),
            e => Self::PoolRejected(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn test_path_requires_two_tokens() {
        assert!(matches!(
            Path::new(vec![token(1)]),
            Err(RouterError::InvalidPath(_))
        ));
        assert!(Path::new(vec![]).is_err());
        let path = Path::new(vec![token(1), token(2)]).unwrap();
        assert_eq!(path.hop_count(), 1);
    }

    #[test]
    fn test_path_rejects_adjacent_duplicates() {
        let err = Path::new(vec![token(1), token(2), token(2)]).unwrap_err();
        assert_eq!(err.error_code(), "invalid_path");
        // Revisiting a token non-adjacently is allowed
        assert!(Path::new(vec![token(1), token(2), token(1)]).is_ok());
    }

    #[test]
    fn test_path_hops() {
        let path = Path::new(vec![token(1), token(2), token(3)]).unwrap();
        let hops: Vec<_> = path.hops().collect();
        assert_eq!(hops, vec![(&token(1), &token(2)), (&token(2), &token(3))]);
        assert_eq!(*path.first(), token(1));
        assert_eq!(*path.last(), token(3));
    }

    #[test]
    fn test_pair_orientation() {
        let pair = Pair {
            address: token(9),
            token0: token(1),
            token1: token(2),
        };
        assert_eq!(pair.orient(&token(1), (10, 20)), (10, 20));
        assert_eq!(pair.orient(&token(2), (10, 20)), (20, 10));
        assert_eq!(pair.outputs_for(&token(1), 5), (5, 0));
        assert_eq!(pair.outputs_for(&token(2), 5), (0, 5));
    }

    #[test]
    fn test_swap_kind_classification() {
        let exact_in = SwapKind::ALL.iter().filter(|k| k.is_exact_input()).count();
        assert_eq!(exact_in, 6);
        for kind in SwapKind::ALL {
            if kind.supports_fee_on_transfer() {
                assert!(kind.is_exact_input(), "{kind} must be exact-input");
            }
            assert!(!(kind.native_in() && kind.native_out()));
        }
    }

    #[test]
    fn test_swap_kind_serde_name_matches_method() {
        for kind in SwapKind::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, kind.as_str());
        }
    }

    #[test]
    fn test_trade_record_json_schema() {
        let record = TradeRecord {
            platform: "uniswap-v2".to_string(),
            contract_address: token(0xaa),
            token_in: token(1),
            token_out: token(2),
            amount_in: 1000,
            amount_out: 1_990,
            initiator: token(7),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["platform"], "uniswap-v2");
        assert_eq!(value["amountIn"], "1000");
        assert_eq!(value["amountOut"], "1990");
        assert_eq!(value["tokenIn"], token(1).to_string());
        assert_eq!(value["contractAddress"], token(0xaa).to_string());
        assert_eq!(value["initiator"], token(7).to_string());
    }

    #[test]
    fn test_swap_call_from_json() {
        let json = format!(
            r#"{{"kind":"swap_exact_tokens_for_tokens","fixed_amount":"1000","bound_amount":0,
                "path":["{}","{}"],"to":"{}","deadline":100}}"#,
            token(1),
            token(2),
            token(3)
        );
        let call: SwapCall = serde_json::from_str(&json).unwrap();
        assert_eq!(call.kind, SwapKind::ExactTokensForTokens);
        assert_eq!(call.fixed_amount, 1000);
        assert_eq!(call.bound_amount, 0);
    }

    #[test]
    fn test_ledger_error_mapping() {
        let err: RouterError = LedgerError::InsufficientBalance {
            token: token(1),
            owner: token(2),
            required: 5,
            available: 1,
        }
        .into();
        assert_eq!(err.error_code(), "transfer_failed");

        let err: RouterError = LedgerError::InsufficientLiquidity { pair: token(3) }.into();
        assert_eq!(err, RouterError::InsufficientLiquidity);

        let err: RouterError = LedgerError::InvariantViolated { pair: token(3) }.into();
        assert_eq!(err.error_code(), "pool_rejected");
    }
}
