// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{Address, Listing, Receipt, TokenId, TxStatus, Wei};
use crate::api::{Marketplace, Wallet, WalletRejection};
use crate::config::{MarketConfig, RefreshFailurePolicy};
use crate::error::MarketError;
use crate::view;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Result of a confirmed transaction. The listing is refreshed right after confirmation and
/// `refresh_error` holds the reason if that refresh failed.
#[derive(Debug)]
pub struct TransactionOutcome {
    pub receipt: Receipt,
    pub refresh_error: Option<MarketError>,
}

/// A user's marketplace session: the connected account, the contract handle signing for it and
/// the last listing read from the contract.
///
/// The listing is a snapshot. It only changes when [Session::refresh_listings] runs, which every
/// confirmed transaction triggers once, so it can lag the contract but never lead it.
pub struct Session<M: Marketplace> {
    config: MarketConfig,
    account: Option<Address>,
    contract: Option<M>,
    listings: Vec<Listing>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<M: Marketplace> Session<M> {
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            account: None,
            contract: None,
            listings: Vec::new(),
            refreshed_at: None,
        }
    }

    /// A session that is already connected through `contract`, signing as `account`.
    pub fn with_contract(config: MarketConfig, account: Address, contract: M) -> Self {
        Self {
            account: Some(account),
            contract: Some(contract),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn contract(&self) -> Option<&M> {
        self.contract.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.contract.is_some()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn listing(&self, token_id: &TokenId) -> Option<&Listing> {
        self.listings
            .iter()
            .find(|listing| &listing.token_id == token_id)
    }

    /// When the listing was last read successfully.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Requests the wallet's accounts and binds the contract handle to the first one, then reads
    /// the listing. `None` means no wallet provider was detected.
    ///
    /// A failed connection leaves the session untouched. A failing first read does not undo the
    /// connection; it is reported like any other refresh failure.
    pub async fn connect<W>(&mut self, wallet: Option<&mut W>) -> Result<Address, MarketError>
    where
        W: Wallet<Handle = M> + Send,
    {
        let result = self.bind_wallet(wallet).await;
        let account = log_failure("connect", result)?;
        // Already logged by the refresh itself.
        let _ = self.refresh_listings().await;
        Ok(account)
    }

    async fn bind_wallet<W>(&mut self, wallet: Option<&mut W>) -> Result<Address, MarketError>
    where
        W: Wallet<Handle = M> + Send,
    {
        let wallet = wallet.ok_or(MarketError::ProviderNotFound)?;
        let accounts = wallet
            .request_accounts()
            .await
            .map_err(|err| match err.downcast_ref::<WalletRejection>() {
                Some(rejection) => MarketError::ConnectionRejected(rejection.0.clone()),
                None => MarketError::ConnectionFailed(err),
            })?;
        let account = *accounts.first().ok_or(MarketError::NoAccounts)?;
        let contract = wallet.bind(self.config.contract_address, account);
        info!(%account, contract = %contract.address(), "connected to marketplace");
        self.account = Some(account);
        self.contract = Some(contract);
        Ok(account)
    }

    /// Replaces the listing with the contract's current one.
    ///
    /// When the read fails the listing is cleared or kept according to
    /// [MarketConfig::refresh_failure].
    pub async fn refresh_listings(&mut self) -> Result<&[Listing], MarketError> {
        let result = self.read_listings().await;
        log_failure("refresh listings", result)
    }

    async fn read_listings(&mut self) -> Result<&[Listing], MarketError> {
        let contract = self.contract.as_ref().ok_or(MarketError::NotConnected)?;
        match contract.get_nfts_for_sale().await {
            Ok(listings) => {
                self.listings = listings;
                self.refreshed_at = Some(Utc::now());
                Ok(&self.listings)
            }
            Err(err) => {
                match self.config.refresh_failure {
                    RefreshFailurePolicy::ClearListings => {
                        warn!(
                            stale = self.listings.len(),
                            "clearing listings after failed read"
                        );
                        self.listings.clear();
                        self.refreshed_at = None;
                    }
                    RefreshFailurePolicy::KeepStale => {
                        warn!(
                            stale = self.listings.len(),
                            "keeping stale listings after failed read"
                        );
                    }
                }
                Err(MarketError::ReadFailed(err))
            }
        }
    }

    /// Mints a token for the connected account with an asking price in wei.
    pub async fn mint(&mut self, price: Wei) -> Result<TransactionOutcome, MarketError> {
        let result = self.submit_mint(price).await;
        log_failure("mint", result)
    }

    /// Like [Session::mint], with the price typed in ether.
    pub async fn mint_from_input(
        &mut self,
        price: &str,
    ) -> Result<TransactionOutcome, MarketError> {
        let price = log_failure("mint", view::parse_price_input(price))?;
        self.mint(price).await
    }

    async fn submit_mint(&mut self, price: Wei) -> Result<TransactionOutcome, MarketError> {
        let account = self.account.ok_or(MarketError::NotConnected)?;
        let timeout = self.config.confirmation_timeout;
        let contract = self.contract.as_mut().ok_or(MarketError::NotConnected)?;
        let receipt = confirm(timeout, contract.mint_nft(account, price)).await?;
        self.after_confirmation(receipt).await
    }

    /// Buys a token from the current listing, paying the listed price.
    ///
    /// Tokens missing from the listing snapshot are refused before anything is sent to the
    /// wallet; refresh the listing first if it may be stale.
    pub async fn buy(&mut self, token_id: &TokenId) -> Result<TransactionOutcome, MarketError> {
        let result = self.submit_buy(token_id).await;
        log_failure("buy", result)
    }

    pub async fn buy_from_input(
        &mut self,
        token_id: &str,
    ) -> Result<TransactionOutcome, MarketError> {
        let token_id = log_failure("buy", view::parse_token_id_input(token_id))?;
        self.buy(&token_id).await
    }

    async fn submit_buy(&mut self, token_id: &TokenId) -> Result<TransactionOutcome, MarketError> {
        if !self.is_connected() {
            return Err(MarketError::NotConnected);
        }
        let payment = self
            .listing(token_id)
            .map(|listing| listing.price.clone())
            .ok_or_else(|| MarketError::ListingNotFound(token_id.clone()))?;
        let timeout = self.config.confirmation_timeout;
        let contract = self.contract.as_mut().ok_or(MarketError::NotConnected)?;
        let receipt = confirm(timeout, contract.buy_nft(token_id, payment)).await?;
        self.after_confirmation(receipt).await
    }

    /// Offers an owned token for sale at a price in wei.
    pub async fn list_for_sale(
        &mut self,
        token_id: &TokenId,
        price: Wei,
    ) -> Result<TransactionOutcome, MarketError> {
        let result = self.submit_listing(token_id, price).await;
        log_failure("list for sale", result)
    }

    pub async fn list_from_input(
        &mut self,
        token_id: &str,
        price: &str,
    ) -> Result<TransactionOutcome, MarketError> {
        let parsed = view::parse_token_id_input(token_id)
            .and_then(|token_id| view::parse_price_input(price).map(|price| (token_id, price)));
        let (token_id, price) = log_failure("list for sale", parsed)?;
        self.list_for_sale(&token_id, price).await
    }

    async fn submit_listing(
        &mut self,
        token_id: &TokenId,
        price: Wei,
    ) -> Result<TransactionOutcome, MarketError> {
        let timeout = self.config.confirmation_timeout;
        let contract = self.contract.as_mut().ok_or(MarketError::NotConnected)?;
        let receipt = confirm(timeout, contract.list_nft_for_sale(token_id, price)).await?;
        self.after_confirmation(receipt).await
    }

    async fn after_confirmation(
        &mut self,
        receipt: Receipt,
    ) -> Result<TransactionOutcome, MarketError> {
        if receipt.status == TxStatus::Reverted {
            return Err(MarketError::TransactionReverted(receipt.transaction_hash));
        }
        info!(
            hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            "transaction confirmed"
        );
        let refresh_error = self.refresh_listings().await.err();
        Ok(TransactionOutcome {
            receipt,
            refresh_error,
        })
    }
}

/// Awaits a submitted transaction, giving up after `timeout` if one is set.
async fn confirm<F>(
    timeout: Option<std::time::Duration>,
    submission: F,
) -> Result<Receipt, MarketError>
where
    F: Future<Output = anyhow::Result<Receipt>>,
{
    let result = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, submission).await {
            Ok(result) => result,
            Err(_) => {
                return Err(MarketError::TransactionFailed(anyhow::format_err!(
                    "No confirmation within {:?}",
                    timeout
                )));
            }
        },
        None => submission.await,
    };
    result.map_err(|err| match err.downcast_ref::<WalletRejection>() {
        Some(rejection) => MarketError::TransactionRejected(rejection.0.clone()),
        None => MarketError::TransactionFailed(err),
    })
}

fn log_failure<T>(action: &'static str, result: Result<T, MarketError>) -> Result<T, MarketError> {
    if let Err(err) = &result {
        error!(action, error = %err, "marketplace action failed");
    }
    result
}
