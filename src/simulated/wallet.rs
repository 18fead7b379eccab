// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::Address;
use crate::api::{Wallet, WalletRejection};
use crate::simulated::marketplace::SimulatedMarketplace;
use anyhow::{Result, format_err};
use async_trait::async_trait;

/// A [Wallet] exposing fixed accounts and signing for a [SimulatedMarketplace].
pub struct SimulatedWallet {
    marketplace: SimulatedMarketplace,
    accounts: Vec<Address>,
    reject_connection: bool,
    unavailable: bool,
}

impl SimulatedWallet {
    pub fn new(marketplace: SimulatedMarketplace, accounts: Vec<Address>) -> Self {
        Self {
            marketplace,
            accounts,
            reject_connection: false,
            unavailable: false,
        }
    }

    /// The user declines the account request.
    pub fn rejecting(mut self) -> Self {
        self.reject_connection = true;
        self
    }

    /// The wallet cannot be reached when accounts are requested.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl Wallet for SimulatedWallet {
    type Handle = SimulatedMarketplace;

    async fn request_accounts(&mut self) -> Result<Vec<Address>> {
        if self.unavailable {
            return Err(format_err!("Simulated wallet is unavailable"));
        }
        if self.reject_connection {
            return Err(WalletRejection("User rejected the request".into()).into());
        }
        Ok(self.accounts.clone())
    }

    fn bind(&self, contract: Address, signer: Address) -> SimulatedMarketplace {
        self.marketplace.connect_as(signer).at_address(contract)
    }
}
