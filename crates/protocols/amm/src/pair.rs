//! Pair Locator
//!
//! Canonical token ordering, deterministic pair address derivation and
//! reserve lookup through an injected [`PairBackend`].

use sha3::{Digest, Keccak256};
use swaptrace_core::{Address, Amount, RouterConfig};

use crate::host::PairBackend;
use crate::state::{Pair, RouterError};

/// Prefix byte of a CREATE2 address preimage
const CREATE2_PREFIX: u8 = 0xff;

/// Sort two tokens into canonical `(token0, token1)` order.
pub fn sort_tokens(token_a: &Address, token_b: &Address) -> Result<(Address, Address), RouterError> {
    if token_a == token_b {
        return Err(RouterError::IdenticalTokens(*token_a));
    }
    let (token0, token1) = if token_a < token_b {
        (*token_a, *token_b)
    } else {
        (*token_b, *token_a)
    };
    if token0.is_zero() {
        return Err(RouterError::ZeroAddress);
    }
    Ok((token0, token1))
}

fn keccak256(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// `keccak256(0xff ‖ deployer ‖ salt ‖ init_code_hash)[12..]`
fn create2_address(deployer: &Address, salt: &[u8; 32], init_code_hash: &[u8; 32]) -> Address {
    let digest = keccak256(&[&[CREATE2_PREFIX], deployer.as_bytes(), salt, init_code_hash]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::from_bytes(bytes)
}

/// Derives pair identities for a factory and reads their reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairLocator {
    factory: Address,
    init_code_hash: [u8; 32],
}

impl PairLocator {
    pub fn new(factory: Address, init_code_hash: [u8; 32]) -> Self {
        Self {
            factory,
            init_code_hash,
        }
    }

    pub fn from_config(config: &RouterConfig) -> swaptrace_core::Result<Self> {
        Ok(Self::new(config.factory, config.init_code_hash_bytes()?))
    }

    pub fn factory(&self) -> &Address {
        &self.factory
    }

    /// Locate the pair for an unordered token couple.
    ///
    /// The result does not depend on argument order.
    pub fn locate(&self, token_a: &Address, token_b: &Address) -> Result<Pair, RouterError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let salt = keccak256(&[token0.as_bytes(), token1.as_bytes()]);
        Ok(Pair {
            address: create2_address(&self.factory, &salt, &self.init_code_hash),
            token0,
            token1,
        })
    }

    pub fn pair_for(&self, token_a: &Address, token_b: &Address) -> Result<Address, RouterError> {
        Ok(self.locate(token_a, token_b)?.address)
    }

    /// Reserves of the `(token_in, token_out)` pair, oriented as
    /// `(reserve_in, reserve_out)`.
    pub fn get_reserves<B: PairBackend + ?Sized>(
        &self,
        backend: &B,
        token_in: &Address,
        token_out: &Address,
    ) -> Result<(Amount, Amount), RouterError> {
        let pair = self.locate(token_in, token_out)?;
        let reserves = backend.reserves(&pair.address)?;
        Ok(pair.orient(token_in, reserves))
    }
}
