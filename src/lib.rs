// SPDX-License-Identifier: GPL-3.0-or-later

//! Client for a pre-deployed NFT marketplace contract.
//!
//! A [Session] connects a wallet, keeps a snapshot of the tokens for sale and submits mint,
//! buy and list transactions to the contract through a [api::Marketplace] handle. The
//! [simulated] module provides an in-memory contract and wallet; the `live` module (feature
//! `live`) talks to a JSON-RPC wallet provider.

pub mod abi;
pub mod api;
pub mod config;
pub mod error;
#[cfg(feature = "live")]
pub mod live;
pub mod session;
pub mod simulated;
pub mod view;

pub use config::MarketConfig;
pub use error::MarketError;
pub use session::{Session, TransactionOutcome};
