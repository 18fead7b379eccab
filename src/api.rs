// SPDX-License-Identifier: GPL-3.0-or-later

pub mod common;
pub mod units;

pub use marketplace::Marketplace;
mod marketplace;

pub use wallet::{Wallet, WalletRejection};
mod wallet;
