//! Shared fixtures for unit tests

use swaptrace_core::{Address, Amount, FeeConfig, RouterConfig};

use crate::ledger::MemoryLedger;
use crate::pair::PairLocator;

pub const WETH: Address = Address::from_bytes([0xee; 20]);
pub const ROUTER: Address = Address::from_bytes([0xaa; 20]);
pub const FACTORY: Address = Address::from_bytes([0xfa; 20]);
pub const INIT_CODE_HASH: [u8; 32] = [0x11; 32];

pub fn token(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

/// Account addresses live in a separate byte range from tokens
pub fn user(n: u8) -> Address {
    let mut bytes = [0x50; 20];
    bytes[19] = n;
    Address::from_bytes(bytes)
}

pub fn fee() -> FeeConfig {
    FeeConfig::default()
}

pub fn locator() -> PairLocator {
    PairLocator::new(FACTORY, INIT_CODE_HASH)
}

pub fn config() -> RouterConfig {
    RouterConfig {
        router_address: ROUTER,
        factory: FACTORY,
        init_code_hash: hex::encode(INIT_CODE_HASH),
        wrapped_native: WETH,
        ..RouterConfig::default()
    }
}

/// Ledger holding one pair per `(token_a, token_b, reserve_a, reserve_b)`
pub fn ledger_with_pairs(pairs: &[(Address, Address, Amount, Amount)]) -> MemoryLedger {
    let mut ledger = MemoryLedger::new(locator(), WETH, fee());
    for (token_a, token_b, reserve_a, reserve_b) in pairs {
        ledger
            .create_pair(token_a, token_b, *reserve_a, *reserve_b)
            .expect("create pair");
    }
    ledger
}
