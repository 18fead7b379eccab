// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::Wallet;
use crate::api::common::Address;
use crate::config::MarketConfig;
use crate::live::marketplace::LiveMarketplace;
use crate::live::rpc::RpcClient;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A wallet provider reachable over JSON-RPC, which holds the keys and signs for the accounts
/// it exposes.
#[derive(Clone, Debug)]
pub struct InjectedWallet {
    rpc: RpcClient,
    chain_id: u64,
    poll_interval: Duration,
    price_getter: Option<String>,
}

impl InjectedWallet {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

/// Looks for the wallet provider configured in [MarketConfig::rpc_url].
///
/// Returns `None` when no endpoint is configured or the endpoint does not answer `eth_chainId`.
pub async fn detect_provider(config: &MarketConfig) -> Option<InjectedWallet> {
    let Some(url) = &config.rpc_url else {
        debug!("no wallet provider endpoint configured");
        return None;
    };
    let rpc = RpcClient::new(url.as_str());
    match rpc.chain_id().await {
        Ok(chain_id) => {
            info!(url = %url, chain_id, "detected wallet provider");
            Some(InjectedWallet {
                rpc,
                chain_id,
                poll_interval: config.poll_interval,
                price_getter: config.price_getter.clone(),
            })
        }
        Err(err) => {
            warn!(url = %url, error = %err, "wallet provider did not respond");
            None
        }
    }
}

#[async_trait]
impl Wallet for InjectedWallet {
    type Handle = LiveMarketplace;

    async fn request_accounts(&mut self) -> Result<Vec<Address>> {
        self.rpc.request_accounts().await
    }

    fn bind(&self, contract: Address, signer: Address) -> LiveMarketplace {
        LiveMarketplace::new(
            self.rpc.clone(),
            contract,
            signer,
            self.poll_interval,
            self.price_getter.clone(),
        )
    }
}
