// SPDX-License-Identifier: GPL-3.0-or-later

pub use marketplace::LiveMarketplace;
mod marketplace;

pub use rpc::{RpcClient, RpcError};
mod rpc;

pub use wallet::{InjectedWallet, detect_provider};
mod wallet;
