// SPDX-License-Identifier: GPL-3.0-or-later

//! Text presentation of a session and parsing of the values a user types in.

use crate::api::Marketplace;
use crate::api::common::{Listing, TokenId, Wei};
use crate::api::units;
use crate::error::MarketError;
use crate::session::Session;
use std::fmt::Write;
use std::str::FromStr;

/// Parses an ether price typed by the user into wei.
pub fn parse_price_input(input: &str) -> Result<Wei, MarketError> {
    units::parse_ether(input).map_err(|err| MarketError::InvalidPrice {
        input: input.into(),
        reason: err.to_string(),
    })
}

pub fn parse_token_id_input(input: &str) -> Result<TokenId, MarketError> {
    TokenId::from_str(input).map_err(|_| MarketError::InvalidTokenId(input.into()))
}

pub fn render_listing(listing: &Listing) -> String {
    format!(
        "ID: {} - Price: {} ETH",
        listing.token_id,
        listing.price_in_ether()
    )
}

/// Renders the connected account followed by the tokens for sale, one per line.
pub fn render<M: Marketplace>(session: &Session<M>) -> String {
    let mut out = String::new();
    match session.account() {
        Some(account) => {
            let _ = writeln!(out, "Connected account: {account}");
        }
        None => out.push_str("Not connected\n"),
    }
    out.push_str("NFTs for sale:\n");
    if session.listings().is_empty() {
        out.push_str("  (none)\n");
    }
    for listing in session.listings() {
        let _ = writeln!(out, "  {}", render_listing(listing));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::Address;
    use crate::api::units::parse_ether;
    use crate::config::MarketConfig;
    use crate::simulated::{SimulatedLedgerBuilder, SimulatedMarketplace};
    use anyhow::Result;

    #[test]
    fn render_listing_in_ether() -> Result<()> {
        let listing = Listing::new(TokenId::from(3), parse_ether("0.5")?);
        assert_eq!(render_listing(&listing), "ID: 3 - Price: 0.5 ETH");
        Ok(())
    }

    #[test]
    fn render_disconnected_session() {
        let session = Session::<SimulatedMarketplace>::new(MarketConfig::default());
        assert_eq!(render(&session), "Not connected\nNFTs for sale:\n  (none)\n");
    }

    #[tokio::test]
    async fn render_connected_session() -> Result<()> {
        let account = Address([0x11; 20]);
        let ledger = SimulatedLedgerBuilder::new()
            .add_token(account, parse_ether("1")?, true)
            .add_token(account, parse_ether("2.5")?, true)
            .build();
        let contract = SimulatedMarketplace::new(ledger, Address([0xcc; 20]), account);
        let mut session = Session::with_contract(MarketConfig::default(), account, contract);
        session.refresh_listings().await?;

        assert_eq!(
            render(&session),
            "Connected account: 0x1111111111111111111111111111111111111111\n\
             NFTs for sale:\n  \
             ID: 1 - Price: 1.0 ETH\n  \
             ID: 2 - Price: 2.5 ETH\n"
        );
        Ok(())
    }

    #[test]
    fn parse_inputs() -> Result<()> {
        assert_eq!(parse_price_input(" 0.5 ")?, parse_ether("0.5")?);
        assert_eq!(parse_token_id_input("7")?, TokenId::from(7));

        let err = parse_price_input("1.2.3").unwrap_err();
        assert!(matches!(err, MarketError::InvalidPrice { ref input, .. } if input == "1.2.3"));
        let err = parse_token_id_input("abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid token id \"abc\"");
        Ok(())
    }
}
