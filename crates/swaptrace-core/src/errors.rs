//! Error types for swaptrace

use thiserror::Error;

use crate::types::{Address, Amount};

/// Core errors that can occur in swaptrace
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures reported by the host ledger primitives (token transfers, native
/// currency movements, pair swaps).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient {token} balance for {owner}: need {required}, have {available}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient native balance for {owner}: need {required}, have {available}")]
    InsufficientNativeBalance {
        owner: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Pair not found: {pair}")]
    PairNotFound { pair: Address },

    #[error("Pair already exists: {pair}")]
    PairExists { pair: Address },

    #[error("Insufficient liquidity in pair {pair}")]
    InsufficientLiquidity { pair: Address },

    #[error("Pair {pair} received no input")]
    InsufficientInputAmount { pair: Address },

    #[error("Pair {pair} asked for zero output")]
    InsufficientOutputAmount { pair: Address },

    #[error("Invalid swap recipient {to}")]
    InvalidRecipient { to: Address },

    #[error("Constant product invariant violated in pair {pair}")]
    InvariantViolated { pair: Address },

    #[error("Token {token} is not the wrapped native token")]
    NotWrappedNative { token: Address },

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type alias for swaptrace operations
pub type Result<T> = std::result::Result<T, Error>;

impl LedgerError {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientNativeBalance { .. } => "insufficient_native_balance",
            Self::PairNotFound { .. } => "pair_not_found",
            Self::PairExists { .. } => "pair_exists",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::InsufficientInputAmount { .. } => "insufficient_input_amount",
            Self::InsufficientOutputAmount { .. } => "insufficient_output_amount",
            Self::InvalidRecipient { .. } => "invalid_recipient",
            Self::InvariantViolated { .. } => "invariant_violated",
            Self::NotWrappedNative { .. } => "not_wrapped_native",
            Self::Overflow => "overflow",
        }
    }

    /// Whether the failure came from moving value (as opposed to pool state)
    pub fn is_transfer_failure(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. }
                | Self::InsufficientNativeBalance { .. }
                | Self::NotWrappedNative { .. }
        )
    }
}
