// SPDX-License-Identifier: GPL-3.0-or-later

//! Just enough of the contract ABI to talk to the marketplace: static arguments in, `uint256`
//! and `uint256[]` out.

use crate::api::common::Address;
use anyhow::{Result, format_err};
use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

const WORD: usize = 32;

pub const GET_NFTS_FOR_SALE: &str = "getNFTsForSale()";
pub const MINT_NFT: &str = "mintNFT(address,uint256)";
pub const BUY_NFT: &str = "buyNFT(uint256)";
pub const LIST_NFT_FOR_SALE: &str = "listNFTForSale(uint256,uint256)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(BigUint),
}

pub fn selector(signature: &str) -> [u8; 4] {
    let mut hasher = Keccak256::default();
    hasher.update(signature.as_bytes());
    let hash = hasher.finalize();
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Builds call data: the function selector followed by one word per argument.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&encode_token(arg)?);
    }
    Ok(data)
}

fn encode_token(token: &Token) -> Result<[u8; WORD]> {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(address) => word[WORD - 20..].copy_from_slice(&address.0),
        Token::Uint(value) => {
            let bytes = value.to_bytes_be();
            if bytes.len() > WORD {
                return Err(format_err!("{} does not fit in a uint256", value));
            }
            word[WORD - bytes.len()..].copy_from_slice(&bytes);
        }
    }
    Ok(word)
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or(format_err!("Return data too short to read word at {}", offset))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize> {
    let value = BigUint::from_bytes_be(read_word(data, offset)?);
    usize::try_from(&value).map_err(|_| format_err!("{} is not a valid length or offset", value))
}

pub fn decode_uint(data: &[u8]) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(read_word(data, 0)?))
}

pub fn decode_uint_array(data: &[u8]) -> Result<Vec<BigUint>> {
    let offset = read_usize(data, 0)?;
    let length = read_usize(data, offset)?;
    (0..length)
        .map(|index| {
            let position = offset.saturating_add(WORD.saturating_mul(index + 1));
            read_word(data, position).map(BigUint::from_bytes_be)
        })
        .collect()
}
