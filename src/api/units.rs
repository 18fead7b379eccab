// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversion between ether amounts typed by a user and wei.

use crate::api::common::Wei;
use anyhow::{Result, format_err};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use std::str::FromStr;

/// Number of decimal places between one ether and one wei.
pub const ETHER_DECIMALS: u32 = 18;

pub(crate) const UINT256_BITS: u64 = 256;

/// 10^78 is the smallest power of ten above the uint256 range.
const MAX_UINT256_DIGITS: i64 = 77;

/// Parses a decimal ether amount such as `"0.5"` into wei.
///
/// Negative amounts and amounts with more than 18 decimal places are rejected, since they
/// have no exact wei representation.
pub fn parse_ether(input: &str) -> Result<Wei> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format_err!("Amount is empty"));
    }
    let value = BigDecimal::from_str(trimmed)?;
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    if digits.sign() == Sign::Minus {
        return Err(format_err!("Amount {} is negative", trimmed));
    }
    if scale > ETHER_DECIMALS as i64 {
        return Err(format_err!(
            "Amount {} has more than {} decimal places",
            trimmed,
            ETHER_DECIMALS
        ));
    }
    let exponent = ETHER_DECIMALS as i64 - scale;
    if exponent > MAX_UINT256_DIGITS && digits.sign() != Sign::NoSign {
        return Err(too_large(trimmed));
    }
    let exponent = u32::try_from(exponent).map_err(|_| too_large(trimmed))?;
    let wei = (digits * BigInt::from(10u8).pow(exponent))
        .to_biguint()
        .ok_or(format_err!("Amount {} is negative", trimmed))?;
    if wei.bits() > UINT256_BITS {
        return Err(too_large(trimmed));
    }
    Ok(wei)
}

fn too_large(amount: &str) -> anyhow::Error {
    format_err!("Amount {} does not fit in a uint256", amount)
}

/// Formats wei as ether, always keeping at least one fractional digit (`1.0`, `0.5`).
pub fn format_ether(wei: &Wei) -> String {
    let decimals = ETHER_DECIMALS as usize;
    let mut digits = wei.to_string();
    if digits.len() <= decimals {
        digits = format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits);
    }
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn parse_half_ether() -> Result<()> {
        assert_eq!(
            parse_ether("0.5")?,
            BigUint::from(500_000_000_000_000_000u64)
        );
        Ok(())
    }

    #[test]
    fn parse_whole_and_smallest_amounts() -> Result<()> {
        assert_eq!(
            parse_ether("2")?,
            BigUint::from(2_000_000_000_000_000_000u128)
        );
        assert_eq!(parse_ether("0.000000000000000001")?, BigUint::from(1u8));
        assert_eq!(parse_ether("0")?, BigUint::from(0u8));
        Ok(())
    }

    #[test]
    fn parse_rejects_invalid_amounts() {
        assert_eq!(parse_ether("").unwrap_err().to_string(), "Amount is empty");
        assert_eq!(
            parse_ether("-1").unwrap_err().to_string(),
            "Amount -1 is negative"
        );
        assert_eq!(
            parse_ether("0.0000000000000000001").unwrap_err().to_string(),
            "Amount 0.0000000000000000001 has more than 18 decimal places"
        );
        assert!(parse_ether("abc").is_err());
    }

    #[test]
    fn parse_rejects_amounts_above_uint256() -> Result<()> {
        assert_eq!(
            parse_ether("1e4294967278").unwrap_err().to_string(),
            "Amount 1e4294967278 does not fit in a uint256"
        );
        assert!(parse_ether("1e2000000000").is_err());
        assert!(parse_ether("1e60").is_err());

        // 2^256 - 1 wei is the largest amount a contract call can carry.
        let max_wei = (BigUint::from(1u8) << 256) - 1u8;
        let max_ether = format_ether(&max_wei);
        assert_eq!(parse_ether(&max_ether)?, max_wei);
        assert!(parse_ether(&format_ether(&(max_wei + 1u8))).is_err());
        Ok(())
    }

    #[test]
    fn format_keeps_one_fractional_digit() {
        assert_eq!(format_ether(&BigUint::from(0u8)), "0.0");
        assert_eq!(
            format_ether(&BigUint::from(1_000_000_000_000_000_000u64)),
            "1.0"
        );
        assert_eq!(format_ether(&BigUint::from(1u8)), "0.000000000000000001");
        assert_eq!(
            format_ether(&BigUint::from(12_340_000_000_000_000_000u128)),
            "12.34"
        );
    }

    #[test]
    fn displayed_prices_survive_conversion() -> Result<()> {
        for displayed in ["0.5", "1.0", "0.000000000000000001", "123.456", "7.0"] {
            assert_eq!(format_ether(&parse_ether(displayed)?), displayed);
        }
        Ok(())
    }
}
