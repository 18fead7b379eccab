// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::units;
use anyhow::{Result, format_err};
use num_bigint::BigUint;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Base unit amount of the chain's native currency.
pub type Wei = BigUint;

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct Address(pub [u8; 20]);

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct TxHash(pub [u8; 32]);

#[derive(Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct TokenId(pub BigUint);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: TxStatus,
    pub block_number: Option<u64>,
}

/// A token offered for sale and its asking price in wei.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub token_id: TokenId,
    pub price: Wei,
}

impl Listing {
    pub fn new(token_id: TokenId, price: Wei) -> Self {
        Self { token_id, price }
    }

    /// Asking price formatted in ether.
    pub fn price_in_ether(&self) -> String {
        units::format_ether(&self.price)
    }
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

pub(crate) fn strip_0x(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

fn parse_hex_array<const N: usize>(input: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(strip_0x(input.trim()))?;
    if bytes.len() != N {
        return Err(format_err!(
            "Expected {} bytes but got {} in {}",
            N,
            bytes.len(),
            input
        ));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(parse_hex_array(s)?))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TxHash(parse_hex_array(s)?))
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl TokenId {
    pub fn from_u64(id: u64) -> Self {
        TokenId(BigUint::from(id))
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        TokenId::from_u64(id)
    }
}

/// Accepts decimal ids and `0x` prefixed hex ids.
impl FromStr for TokenId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, radix) = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (trimmed, 10),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(format_err!("{:?} is not a valid token id", s));
        }
        BigUint::parse_bytes(digits.as_bytes(), radix)
            .filter(|id| id.bits() <= units::UINT256_BITS)
            .map(TokenId)
            .ok_or(format_err!("{:?} is not a valid token id", s))
    }
}

impl Display for TokenId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trips_through_hex() -> Result<()> {
        let address = Address::from_str("0xC3Ba5050Ec45990f76474163c5bA673c244aaECA")?;
        assert_eq!(
            address.to_string(),
            "0xc3ba5050ec45990f76474163c5ba673c244aaeca"
        );
        Ok(())
    }

    #[test]
    fn address_with_wrong_length() {
        let err = Address::from_str("0x1234").unwrap_err();
        assert_eq!(err.to_string(), "Expected 20 bytes but got 2 in 0x1234");
    }

    #[test]
    fn token_id_parses_decimal_and_hex() -> Result<()> {
        assert_eq!(TokenId::from_str("42")?, TokenId::from(42));
        assert_eq!(TokenId::from_str(" 0x2a ")?, TokenId::from(42));
        Ok(())
    }

    #[test]
    fn token_id_rejects_garbage() {
        assert!(TokenId::from_str("").is_err());
        assert!(TokenId::from_str("-1").is_err());
        assert!(TokenId::from_str("1.5").is_err());
        assert!(TokenId::from_str("1_0").is_err());
        assert!(TokenId::from_str("+7").is_err());
        assert!(TokenId::from_str("0x").is_err());
        assert!(TokenId::from_str("0x_ff").is_err());
    }

    #[test]
    fn token_id_must_fit_in_uint256() -> Result<()> {
        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(TokenId::from_str(&max)?.0.bits(), 256);
        let err = TokenId::from_str(&format!("0x1{}", "0".repeat(64))).unwrap_err();
        assert!(err.to_string().ends_with("is not a valid token id"));
        Ok(())
    }

    #[test]
    fn listing_price_in_ether() {
        let listing = Listing::new(
            TokenId::from(1),
            BigUint::from(500_000_000_000_000_000u64),
        );
        assert_eq!(listing.price_in_ether(), "0.5");
    }
}
