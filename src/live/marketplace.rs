// SPDX-License-Identifier: GPL-3.0-or-later

use crate::abi::{self, Token};
use crate::api::Marketplace;
use crate::api::common::{Address, Listing, Receipt, TokenId, TxHash, Wei};
use crate::live::rpc::RpcClient;
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const MAX_RECEIPT_READ_FAILURES: usize = 5;

/// The deployed marketplace contract, reached through a wallet provider that signs as `signer`.
#[derive(Clone, Debug)]
pub struct LiveMarketplace {
    rpc: RpcClient,
    address: Address,
    signer: Address,
    poll_interval: Duration,
    price_getter: Option<String>,
}

impl LiveMarketplace {
    pub fn new(
        rpc: RpcClient,
        address: Address,
        signer: Address,
        poll_interval: Duration,
        price_getter: Option<String>,
    ) -> Self {
        Self {
            rpc,
            address,
            signer,
            poll_interval,
            price_getter,
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    async fn price_of(&self, token_id: &TokenId) -> Result<Wei> {
        match &self.price_getter {
            Some(getter) => {
                let data = abi::encode_call(getter, &[Token::Uint(token_id.0.clone())])?;
                abi::decode_uint(&self.rpc.call(&self.address, &data).await?)
            }
            // The contract only reports ids, which are displayed as the asking price.
            None => Ok(token_id.0.clone()),
        }
    }

    async fn transact(&self, signature: &str, args: &[Token], value: Wei) -> Result<Receipt> {
        let data = abi::encode_call(signature, args)?;
        let hash = self
            .rpc
            .send_transaction(&self.signer, &self.address, &data, &value)
            .await?;
        info!(%hash, function = signature, "transaction submitted");
        self.wait_for_receipt(&hash).await
    }

    /// Polls until the transaction is mined. Failed receipt reads are retried, since the
    /// transaction is already broadcast and may still be mined.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<Receipt> {
        let mut failures = 0;
        loop {
            match self.rpc.transaction_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {
                    failures = 0;
                    debug!(%hash, "transaction pending");
                }
                Err(err) if failures < MAX_RECEIPT_READ_FAILURES => {
                    failures += 1;
                    warn!(%hash, error = %err, failures, "failed to read receipt, retrying");
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "Transaction {} was sent but its receipt could not be read",
                        hash
                    )));
                }
            }
            sleep(self.poll_interval).await;
        }
    }
}

impl Marketplace for LiveMarketplace {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_nfts_for_sale(&self) -> Result<Vec<Listing>> {
        let data = abi::encode_call(abi::GET_NFTS_FOR_SALE, &[])?;
        let ids = abi::decode_uint_array(&self.rpc.call(&self.address, &data).await?)?;
        let mut listings = Vec::with_capacity(ids.len());
        for id in ids {
            let token_id = TokenId(id);
            let price = self.price_of(&token_id).await?;
            listings.push(Listing::new(token_id, price));
        }
        Ok(listings)
    }

    async fn mint_nft(&mut self, recipient: Address, price: Wei) -> Result<Receipt> {
        self.transact(
            abi::MINT_NFT,
            &[Token::Address(recipient), Token::Uint(price)],
            Wei::from(0u8),
        )
        .await
    }

    async fn buy_nft(&mut self, token_id: &TokenId, payment: Wei) -> Result<Receipt> {
        self.transact(abi::BUY_NFT, &[Token::Uint(token_id.0.clone())], payment)
            .await
    }

    async fn list_nft_for_sale(&mut self, token_id: &TokenId, price: Wei) -> Result<Receipt> {
        self.transact(
            abi::LIST_NFT_FOR_SALE,
            &[Token::Uint(token_id.0.clone()), Token::Uint(price)],
            Wei::from(0u8),
        )
        .await
    }
}
