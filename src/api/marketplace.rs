// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{Address, Listing, Receipt, TokenId, Wei};
use anyhow::Result;

/// A handle to a deployed marketplace contract, bound to the account that signs its transactions.
///
/// Mutating calls resolve once the transaction is confirmed. A confirmed but reverted transaction
/// is reported through [Receipt::status], while a transaction the wallet refuses to sign fails with
/// a [WalletRejection](crate::api::WalletRejection) error.
pub trait Marketplace {
    /// Address of the contract this handle talks to.
    fn address(&self) -> Address;

    /// Returns every token currently offered for sale, with its asking price.
    fn get_nfts_for_sale(&self) -> impl Future<Output = Result<Vec<Listing>>> + Send;

    /// Mints a new token for `recipient` with the given asking price.
    fn mint_nft(
        &mut self,
        recipient: Address,
        price: Wei,
    ) -> impl Future<Output = Result<Receipt>> + Send;

    /// Buys a listed token, paying `payment` along with the transaction.
    fn buy_nft(
        &mut self,
        token_id: &TokenId,
        payment: Wei,
    ) -> impl Future<Output = Result<Receipt>> + Send;

    /// Offers an owned token for sale at the given price.
    fn list_nft_for_sale(
        &mut self,
        token_id: &TokenId,
        price: Wei,
    ) -> impl Future<Output = Result<Receipt>> + Send;
}
