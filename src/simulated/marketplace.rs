// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::Marketplace;
use crate::api::common::{Address, Listing, Receipt, TokenId, Wei};
use crate::simulated::ledger::{ContractCall, SimulatedLedger, SubmittedTransaction};
use anyhow::Result;
use num_bigint::BigUint;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A [Marketplace] backed by a [SimulatedLedger].
///
/// Clones share the same ledger, so a test can keep one handle to inspect what another one
/// submitted. [SimulatedMarketplace::connect_as] creates a handle signing for another account.
#[derive(Clone, Debug)]
pub struct SimulatedMarketplace {
    ledger: Arc<Mutex<SimulatedLedger>>,
    address: Address,
    signer: Address,
}

impl SimulatedMarketplace {
    pub fn new(ledger: SimulatedLedger, address: Address, signer: Address) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            address,
            signer,
        }
    }

    pub fn connect_as(&self, signer: Address) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            address: self.address,
            signer,
        }
    }

    pub(crate) fn at_address(&self, address: Address) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn ledger(&self) -> MutexGuard<'_, SimulatedLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transactions(&self) -> Vec<SubmittedTransaction> {
        self.ledger().transactions().to_vec()
    }

    pub fn listing_reads(&self) -> usize {
        self.ledger().listing_reads()
    }

    pub fn set_fail_reads(&self, fail_reads: bool) {
        self.ledger().set_fail_reads(fail_reads)
    }

    pub fn set_reject_transactions(&self, reject_transactions: bool) {
        self.ledger().set_reject_transactions(reject_transactions)
    }

    fn submit(&self, call: ContractCall, value: Wei) -> Result<Receipt> {
        self.ledger().submit(self.signer, call, value)
    }
}

impl Marketplace for SimulatedMarketplace {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_nfts_for_sale(&self) -> Result<Vec<Listing>> {
        self.ledger().listings()
    }

    async fn mint_nft(&mut self, recipient: Address, price: Wei) -> Result<Receipt> {
        self.submit(ContractCall::Mint { recipient, price }, BigUint::from(0u8))
    }

    async fn buy_nft(&mut self, token_id: &TokenId, payment: Wei) -> Result<Receipt> {
        self.submit(
            ContractCall::Buy {
                token_id: token_id.clone(),
            },
            payment,
        )
    }

    async fn list_nft_for_sale(&mut self, token_id: &TokenId, price: Wei) -> Result<Receipt> {
        self.submit(
            ContractCall::ListForSale {
                token_id: token_id.clone(),
                price,
            },
            BigUint::from(0u8),
        )
    }
}
