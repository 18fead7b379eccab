// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::Address;
use crate::api::marketplace::Marketplace;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// A wallet that holds the user's keys and authorizes requests on their behalf.
#[async_trait]
pub trait Wallet {
    type Handle: Marketplace;

    /// Asks the user to expose their accounts. The first one is used for signing.
    async fn request_accounts(&mut self) -> Result<Vec<Address>>;

    /// Creates a contract handle whose transactions are signed by `signer`.
    fn bind(&self, contract: Address, signer: Address) -> Self::Handle;
}

/// The user declined a request in their wallet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("request rejected by wallet: {0}")]
pub struct WalletRejection(pub String);
