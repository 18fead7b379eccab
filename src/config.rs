// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::Address;
use anyhow::{Result, format_err};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Address of the deployed AcaoNFT marketplace contract.
pub const DEFAULT_CONTRACT_ADDRESS: Address = Address([
    0xc3, 0xba, 0x50, 0x50, 0xec, 0x45, 0x99, 0x0f, 0x76, 0x47, 0x41, 0x63, 0xc5, 0xba, 0x67, 0x3c,
    0x24, 0x4a, 0xae, 0xca,
]);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What happens to the listing snapshot when reading the listings fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshFailurePolicy {
    /// Treat an unreadable listing as an empty one.
    #[default]
    ClearListings,
    /// Keep showing the last listing that was read successfully.
    KeepStale,
}

impl FromStr for RefreshFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(RefreshFailurePolicy::ClearListings),
            "keep" => Ok(RefreshFailurePolicy::KeepStale),
            other => Err(format_err!(
                "Unknown refresh failure policy {:?}, expected clear or keep",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    pub contract_address: Address,
    /// JSON-RPC endpoint of the wallet provider. No endpoint means no provider.
    pub rpc_url: Option<String>,
    pub refresh_failure: RefreshFailurePolicy,
    pub poll_interval: Duration,
    /// None waits for confirmations indefinitely.
    pub confirmation_timeout: Option<Duration>,
    /// Signature of a `uint256 -> uint256` view returning a token's price, e.g.
    /// `nftPrices(uint256)`. Without it the listed id is read as the price in wei.
    pub price_getter: Option<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfigBuilder::new().build()
    }
}

impl MarketConfig {
    /// Reads the configuration from `MARKET_*` environment variables, falling back to defaults
    /// for the ones that are not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = MarketConfigBuilder::new();
        if let Some(address) = lookup("MARKET_CONTRACT_ADDRESS") {
            builder.set_contract_address(Address::from_str(&address)?);
        }
        if let Some(rpc_url) = lookup("MARKET_RPC_URL") {
            builder.set_rpc_url(&rpc_url);
        }
        if let Some(policy) = lookup("MARKET_REFRESH_FAILURE") {
            builder.set_refresh_failure(RefreshFailurePolicy::from_str(&policy)?);
        }
        if let Some(millis) = lookup("MARKET_POLL_INTERVAL_MS") {
            builder.set_poll_interval(parse_millis("MARKET_POLL_INTERVAL_MS", &millis)?);
        }
        if let Some(millis) = lookup("MARKET_CONFIRMATION_TIMEOUT_MS") {
            builder.set_confirmation_timeout(parse_millis(
                "MARKET_CONFIRMATION_TIMEOUT_MS",
                &millis,
            )?);
        }
        if let Some(signature) = lookup("MARKET_PRICE_GETTER") {
            builder.set_price_getter(&signature);
        }
        Ok(builder.build())
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    let millis = value
        .trim()
        .parse::<u64>()
        .map_err(|err| format_err!("{} must be a number of milliseconds: {}", key, err))?;
    Ok(Duration::from_millis(millis))
}

pub struct MarketConfigBuilder {
    contract_address: Address,
    rpc_url: Option<String>,
    refresh_failure: RefreshFailurePolicy,
    poll_interval: Duration,
    confirmation_timeout: Option<Duration>,
    price_getter: Option<String>,
}

impl MarketConfigBuilder {
    pub fn new() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            rpc_url: None,
            refresh_failure: RefreshFailurePolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: None,
            price_getter: None,
        }
    }

    pub fn set_contract_address(&mut self, contract_address: Address) -> &mut Self {
        self.contract_address = contract_address;
        self
    }

    pub fn set_rpc_url(&mut self, rpc_url: &str) -> &mut Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    pub fn set_refresh_failure(&mut self, policy: RefreshFailurePolicy) -> &mut Self {
        self.refresh_failure = policy;
        self
    }

    pub fn set_poll_interval(&mut self, poll_interval: Duration) -> &mut Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn set_confirmation_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.confirmation_timeout = Some(timeout);
        self
    }

    pub fn set_price_getter(&mut self, signature: &str) -> &mut Self {
        self.price_getter = Some(signature.into());
        self
    }

    pub fn build(&self) -> MarketConfig {
        MarketConfig {
            contract_address: self.contract_address,
            rpc_url: self.rpc_url.clone(),
            refresh_failure: self.refresh_failure,
            poll_interval: self.poll_interval,
            confirmation_timeout: self.confirmation_timeout,
            price_getter: self.price_getter.clone(),
        }
    }
}

impl Default for MarketConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
