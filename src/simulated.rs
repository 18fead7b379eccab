// SPDX-License-Identifier: GPL-3.0-or-later

pub use ledger::{
    ContractCall, SimulatedLedger, SimulatedLedgerBuilder, SubmittedTransaction, TokenRecord,
};
mod ledger;

pub use marketplace::SimulatedMarketplace;
mod marketplace;

pub use wallet::SimulatedWallet;
mod wallet;
