// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs a session against the in-memory marketplace: connect, buy, mint and list.
//!
//! `RUST_LOG=debug cargo run --example simulated_session` shows the session's logging.

use anyhow::Result;
use nftmarket::Session;
use nftmarket::api::common::Address;
use nftmarket::api::units::parse_ether;
use nftmarket::config::MarketConfigBuilder;
use nftmarket::simulated::{SimulatedLedgerBuilder, SimulatedMarketplace, SimulatedWallet};
use nftmarket::view;
use tracing_subscriber::EnvFilter;

const SELLER: Address = Address([0x5e; 20]);
const BUYER: Address = Address([0xb0; 20]);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = MarketConfigBuilder::new().build();
    let ledger = SimulatedLedgerBuilder::new()
        .set_balance(BUYER, parse_ether("10")?)
        .add_token(SELLER, parse_ether("0.5")?, true)
        .add_token(SELLER, parse_ether("1.25")?, true)
        .build();
    let contract = SimulatedMarketplace::new(ledger, config.contract_address, SELLER);
    let mut wallet = SimulatedWallet::new(contract.clone(), vec![BUYER]);

    let mut session = Session::new(config);
    session.connect(Some(&mut wallet)).await?;
    print!("{}", view::render(&session));

    let outcome = session.buy_from_input("1").await?;
    println!("bought token 1 in {}", outcome.receipt.transaction_hash);

    let outcome = session.mint_from_input("0.75").await?;
    println!("minted in {}", outcome.receipt.transaction_hash);

    session.list_from_input("1", "2").await?;
    print!("{}", view::render(&session));

    println!(
        "buyer balance: {} wei",
        contract.ledger().balance_of(&BUYER)
    );
    Ok(())
}
