//! Configuration types for swaptrace

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PLATFORM;
use crate::errors::{Error, Result};
use crate::types::Address;

/// Pool fee expressed as the fraction of input that is kept for pricing.
///
/// The reference 0.3% fee is `997 / 1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub numerator: u128,
    pub denominator: u128,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            numerator: 997,
            denominator: 1000,
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Platform label written into every trade record
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Address the router executes as (record `contractAddress`)
    pub router_address: Address,

    /// Pair factory used for pair address derivation
    pub factory: Address,

    /// Pair creation code hash (32 bytes, hex)
    pub init_code_hash: String,

    /// Wrapped form of the chain's native currency
    pub wrapped_native: Address,

    /// Swap fee applied by every pair
    #[serde(default)]
    pub fee: FeeConfig,
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn mainnet_address(hex: &str) -> Address {
    Address::parse(hex).unwrap_or(Address::ZERO)
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            router_address: mainnet_address("0x7a250d5630b4cf539739df2c5dacb4c659f2488d"),
            factory: mainnet_address("0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"),
            init_code_hash: "96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
                .to_string(),
            wrapped_native: mainnet_address("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            fee: FeeConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Decode `init_code_hash` into raw bytes
    pub fn init_code_hash_bytes(&self) -> Result<[u8; 32]> {
        let digits = self
            .init_code_hash
            .strip_prefix("0x")
            .unwrap_or(&self.init_code_hash);
        let bytes = hex::decode(digits)
            .map_err(|e| Error::Config(format!("Invalid init code hash: {}", e)))?;
        bytes
            .try_into()
            .map_err(|_| Error::Config("Init code hash must be 32 bytes".to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee.denominator == 0 || self.fee.numerator == 0 {
            return Err(Error::Config("Fee terms must be non-zero".to_string()));
        }
        if self.fee.numerator > self.fee.denominator {
            return Err(Error::Config(format!(
                "Fee numerator {} exceeds denominator {}",
                self.fee.numerator, self.fee.denominator
            )));
        }
        if self.wrapped_native.is_zero() {
            return Err(Error::Config("Wrapped native token is unset".to_string()));
        }
        self.init_code_hash_bytes()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.platform, "uniswap-v2");
        assert_eq!(config.fee, FeeConfig { numerator: 997, denominator: 1000 });
        assert_eq!(
            config.wrapped_native.to_string(),
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = RouterConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = RouterConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.router_address, config.router_address);
        assert_eq!(parsed.init_code_hash, config.init_code_hash);
    }

    #[test]
    fn test_config_defaults_optional_fields() {
        let json = r#"{
            "router_address": "0x0000000000000000000000000000000000000001",
            "factory": "0x0000000000000000000000000000000000000002",
            "init_code_hash": "0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f",
            "wrapped_native": "0x0000000000000000000000000000000000000003"
        }"#;
        let config = RouterConfig::from_json_str(json).unwrap();
        assert_eq!(config.platform, "uniswap-v2");
        assert_eq!(config.fee, FeeConfig::default());
    }

    #[test]
    fn test_config_rejects_bad_fee() {
        let mut config = RouterConfig::default();
        config.fee = FeeConfig {
            numerator: 1001,
            denominator: 1000,
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.fee = FeeConfig {
            numerator: 997,
            denominator: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_short_init_code_hash() {
        let config = RouterConfig {
            init_code_hash: "abcd".to_string(),
            ..RouterConfig::default()
        };
        assert!(config.init_code_hash_bytes().is_err());
    }
}
