use std::{
    path::{Path, PathBuf},
    time::Duration
};

use alloy::primitives::{Address, U256};
use eyre::{Context, eyre};
use serde::{Deserialize, Serialize};
use uniswap_v3::{FeeTier, RetryPolicy, SwapperToken, UniswapV3Addresses, swap::SWAP_AMOUNT_INPUT};

/// Everything a run needs besides the node connection. Every field has a
/// default, so an empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestConfig {
    /// directory holding the compiled contract artifacts
    pub artifacts_dir:   PathBuf,
    /// receives factory and proxy admin ownership; the sender when unset
    pub owner:           Option<Address>,
    pub known_addresses: UniswapV3Addresses,
    pub tokens:          TokensConfig,
    pub pool:            PoolSection,
    pub poll:            PollSection,
    pub swap:            SwapSection
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            artifacts_dir:   PathBuf::from("./artifacts"),
            owner:           None,
            known_addresses: UniswapV3Addresses::default(),
            tokens:          TokensConfig::default(),
            pool:            PoolSection::default(),
            poll:            PollSection::default(),
            swap:            SwapSection::default()
        }
    }
}

impl LoadTestConfig {
    pub fn load_toml_config(config_path: &Path) -> eyre::Result<Self> {
        if !config_path.exists() {
            return Err(eyre!("load test config file does not exist at {:?}", config_path));
        }

        let toml_content = std::fs::read_to_string(config_path)
            .wrap_err_with(|| format!("could not read load test config file {:?}", config_path))?;

        let config: Self = toml::from_str(&toml_content).wrap_err_with(|| {
            format!("could not deserialize load test config file {:?}", config_path)
        })?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        self.pool.fee_tier()?;
        if self.pool.reserve_a == 0 || self.pool.reserve_b == 0 {
            return Err(eyre!("pool reserves must be non-zero"));
        }
        if self.poll.approval_attempts == 0 {
            return Err(eyre!("poll.approval_attempts must be at least 1"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    /// initial supply minted to the sender by each token
    pub mint_amount: u64,
    pub token_a:     TokenConfig,
    pub token_b:     TokenConfig
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            mint_amount: uniswap_v3::swapper::MINT_AMOUNT,
            token_a:     TokenConfig::new("SwapperA", "SA"),
            token_b:     TokenConfig::new("SwapperB", "SB")
        }
    }
}

impl TokensConfig {
    pub fn swapper_token(&self, token: &TokenConfig) -> SwapperToken {
        SwapperToken {
            name:        token.name.clone(),
            symbol:      token.symbol.clone(),
            mint_amount: U256::from(self.mint_amount)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name:    String,
    pub symbol:  String,
    /// bound instead of deployed when non-zero
    #[serde(default)]
    pub address: Address
}

impl TokenConfig {
    fn new(name: &str, symbol: &str) -> Self {
        Self { name: name.to_string(), symbol: symbol.to_string(), address: Address::ZERO }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    /// fee tier in percent: 0.01, 0.05, 0.3 or 1
    pub fee_tier:  f64,
    pub reserve_a: u64,
    pub reserve_b: u64
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            fee_tier:  FeeTier::Standard.percentage(),
            reserve_a: uniswap_v3::pool::POOL_RESERVE_FOR_ONE_TOKEN,
            reserve_b: uniswap_v3::pool::POOL_RESERVE_FOR_ONE_TOKEN
        }
    }
}

impl PoolSection {
    pub fn fee_tier(&self) -> eyre::Result<FeeTier> {
        Ok(FeeTier::from_percentage(self.fee_tier)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSection {
    pub interval_ms:          u64,
    pub timeout_secs:         u64,
    pub approval_interval_ms: u64,
    pub approval_attempts:    u32
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_ms:          2_000,
            timeout_secs:         120,
            approval_interval_ms: 5_000,
            approval_attempts:    24
        }
    }
}

impl PollSection {
    /// Policy for deployments, canaries and pool setup.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::deadline(
            Duration::from_millis(self.interval_ms),
            Duration::from_secs(self.timeout_secs)
        )
    }

    pub fn approval_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(Duration::from_millis(self.approval_interval_ms), self.approval_attempts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapSection {
    /// amount of the inbound token per swap
    pub amount_in: u64,
    /// number of swaps sent by `run`
    pub count:     u64
}

impl Default for SwapSection {
    fn default() -> Self {
        Self { amount_in: SWAP_AMOUNT_INPUT, count: 100 }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, str::FromStr};

    use alloy::primitives::address;
    use uniswap_v3::RetryLimit;

    use super::*;

    #[test]
    fn test_read_config() {
        let path = PathBuf::from_str("./loadtest-config.toml").unwrap();

        let config = LoadTestConfig::load_toml_config(&path);
        config.as_ref().unwrap();
        assert!(config.is_ok());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let config = LoadTestConfig::load_toml_config(&path).unwrap();
        assert_eq!(config, LoadTestConfig::default());
        assert_eq!(config.pool.fee_tier().unwrap(), FeeTier::Standard);
        assert_eq!(config.swap.amount_in, 1_000);
        assert_eq!(config.poll.approval_policy(), RetryPolicy::approvals());
        assert_eq!(config.poll.policy().limit, RetryLimit::Timeout(Duration::from_secs(120)));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: LoadTestConfig = toml::from_str(
            r#"
            [known_addresses]
            factory_v3 = "0x1f98431c8ad98523631ae4a59f267346ea31f984"

            [tokens.token_a]
            name = "Alpha"
            symbol = "A"
            address = "0x00000000000000000000000000000000000000aa"

            [pool]
            fee_tier = 0.05

            [swap]
            count = 5
            "#
        )
        .unwrap();

        assert_eq!(
            config.known_addresses.factory_v3,
            address!("0x1f98431c8ad98523631ae4a59f267346ea31f984")
        );
        assert!(config.known_addresses.weth9.is_zero());
        assert_eq!(config.tokens.token_a.address, address!("0x00000000000000000000000000000000000000aa"));
        assert_eq!(config.tokens.token_b, TokenConfig::new("SwapperB", "SB"));
        assert_eq!(config.pool.fee_tier().unwrap().fee(), 500);
        assert_eq!(config.swap.count, 5);
        assert_eq!(config.swap.amount_in, 1_000);
    }

    #[test]
    fn rejects_unknown_fee_tier_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pool]\nfee_tier = 0.25\n").unwrap();

        assert!(LoadTestConfig::load_toml_config(&path).is_err());
        assert!(LoadTestConfig::load_toml_config(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn serialized_config_loads_back() {
        let mut config = LoadTestConfig::default();
        config.known_addresses.weth9 = address!("0x00000000000000000000000000000000000000bb");
        config.owner = Some(address!("0x00000000000000000000000000000000000000cc"));

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: LoadTestConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
