// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::WalletRejection;
use crate::api::common::{Address, Listing, Receipt, TokenId, TxHash, TxStatus, Wei};
use anyhow::{Result, format_err};
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

/// A call to one of the marketplace's mutating functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    Mint { recipient: Address, price: Wei },
    Buy { token_id: TokenId },
    ListForSale { token_id: TokenId, price: Wei },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub from: Address,
    pub call: ContractCall,
    pub value: Wei,
    pub status: TxStatus,
    pub revert_reason: Option<String>,
    pub block_number: u64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub owner: Address,
    pub price: Wei,
    pub for_sale: bool,
}

/// In-memory bookkeeping of the marketplace contract: token ownership, asking prices, native
/// currency balances and every transaction submitted against it.
#[derive(Debug)]
pub struct SimulatedLedger {
    tokens: BTreeMap<TokenId, TokenRecord>,
    balances: HashMap<Address, Wei>,
    transactions: Vec<SubmittedTransaction>,
    next_token_id: u64,
    block_number: u64,
    listing_reads: usize,
    fail_reads: bool,
    reject_transactions: bool,
}

pub struct SimulatedLedgerBuilder {
    tokens: BTreeMap<TokenId, TokenRecord>,
    balances: HashMap<Address, Wei>,
    next_token_id: u64,
}

impl SimulatedLedgerBuilder {
    pub fn new() -> Self {
        Self {
            tokens: BTreeMap::new(),
            balances: HashMap::new(),
            next_token_id: 1,
        }
    }

    pub fn set_balance(&mut self, account: Address, balance: Wei) -> &mut Self {
        self.balances.insert(account, balance);
        self
    }

    /// Adds an already minted token with the next free id.
    pub fn add_token(&mut self, owner: Address, price: Wei, for_sale: bool) -> &mut Self {
        let token_id = TokenId::from(self.next_token_id);
        self.next_token_id += 1;
        self.tokens.insert(
            token_id,
            TokenRecord {
                owner,
                price,
                for_sale,
            },
        );
        self
    }

    pub fn build(&self) -> SimulatedLedger {
        SimulatedLedger {
            tokens: self.tokens.clone(),
            balances: self.balances.clone(),
            transactions: Vec::new(),
            next_token_id: self.next_token_id,
            block_number: 0,
            listing_reads: 0,
            fail_reads: false,
            reject_transactions: false,
        }
    }
}

impl Default for SimulatedLedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLedger {
    /// Signs and mines a transaction. Rejections and unaffordable payments fail before anything
    /// is recorded; a call the contract refuses is mined with a reverted status.
    pub fn submit(&mut self, from: Address, call: ContractCall, value: Wei) -> Result<Receipt> {
        if self.reject_transactions {
            return Err(WalletRejection("User denied transaction signature".into()).into());
        }
        if self.balance_of(&from) < value {
            return Err(format_err!("Insufficient funds in {} to pay {}", from, value));
        }

        let (status, revert_reason) = match self.execute(from, &call, &value) {
            Ok(()) => (TxStatus::Success, None),
            Err(reason) => {
                debug!(%from, ?call, %reason, "simulated transaction reverted");
                (TxStatus::Reverted, Some(reason))
            }
        };

        self.block_number += 1;
        let transaction = SubmittedTransaction {
            hash: new_transaction_hash(),
            from,
            call,
            value,
            status: status.clone(),
            revert_reason,
            block_number: self.block_number,
            submitted_at: Utc::now(),
        };
        let receipt = Receipt {
            transaction_hash: transaction.hash,
            status,
            block_number: Some(transaction.block_number),
        };
        self.transactions.push(transaction);
        Ok(receipt)
    }

    fn execute(&mut self, from: Address, call: &ContractCall, value: &Wei) -> Result<(), String> {
        let zero = BigUint::from(0u8);
        match call {
            ContractCall::Mint { recipient, price } => {
                if *price == zero {
                    return Err("Price must be greater than zero".into());
                }
                let token_id = TokenId::from(self.next_token_id);
                self.next_token_id += 1;
                self.tokens.insert(
                    token_id,
                    TokenRecord {
                        owner: *recipient,
                        price: price.clone(),
                        for_sale: true,
                    },
                );
            }
            ContractCall::Buy { token_id } => {
                let token = self
                    .tokens
                    .get(token_id)
                    .ok_or(format!("Token {} does not exist", token_id))?;
                if !token.for_sale {
                    return Err(format!("Token {} is not for sale", token_id));
                }
                if token.owner == from {
                    return Err("Owner cannot buy their own token".into());
                }
                if *value < token.price {
                    return Err("Payment below asking price".into());
                }
                let seller = token.owner;
                self.update_balance(&from, value, false);
                self.update_balance(&seller, value, true);
                if let Some(token) = self.tokens.get_mut(token_id) {
                    token.owner = from;
                    token.for_sale = false;
                }
            }
            ContractCall::ListForSale { token_id, price } => {
                let token = self
                    .tokens
                    .get_mut(token_id)
                    .ok_or(format!("Token {} does not exist", token_id))?;
                if token.owner != from {
                    return Err("Only the owner can list a token".into());
                }
                if *price == zero {
                    return Err("Price must be greater than zero".into());
                }
                token.price = price.clone();
                token.for_sale = true;
            }
        }
        Ok(())
    }

    /// Tokens for sale ordered by id. Every call counts as one read.
    pub fn listings(&mut self) -> Result<Vec<Listing>> {
        self.listing_reads += 1;
        if self.fail_reads {
            return Err(format_err!("Simulated read failure"));
        }
        Ok(self
            .tokens
            .iter()
            .filter(|(_, token)| token.for_sale)
            .map(|(token_id, token)| Listing::new(token_id.clone(), token.price.clone()))
            .collect())
    }

    pub fn listing_reads(&self) -> usize {
        self.listing_reads
    }

    pub fn transactions(&self) -> &[SubmittedTransaction] {
        &self.transactions
    }

    pub fn token(&self, token_id: &TokenId) -> Option<&TokenRecord> {
        self.tokens.get(token_id)
    }

    pub fn balance_of(&self, account: &Address) -> Wei {
        self.balances
            .get(account)
            .cloned()
            .unwrap_or(BigUint::from(0u8))
    }

    pub fn set_fail_reads(&mut self, fail_reads: bool) {
        self.fail_reads = fail_reads;
    }

    pub fn set_reject_transactions(&mut self, reject_transactions: bool) {
        self.reject_transactions = reject_transactions;
    }

    fn update_balance(&mut self, account: &Address, amount: &Wei, credit: bool) {
        let previous_balance = self.balance_of(account);
        let balance = if credit {
            previous_balance + amount
        } else {
            previous_balance - amount
        };
        self.balances.insert(*account, balance);
    }
}

fn new_transaction_hash() -> TxHash {
    let mut hash = [0u8; 32];
    hash[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    hash[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    TxHash(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn alice() -> Address {
        Address([0xa1; 20])
    }

    fn bob() -> Address {
        Address([0xb0; 20])
    }

    fn ether(amount: &str) -> Wei {
        crate::api::units::parse_ether(amount).unwrap()
    }

    #[test]
    fn mint_lists_new_token() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new().build();

        let receipt = ledger.submit(
            alice(),
            ContractCall::Mint {
                recipient: alice(),
                price: ether("0.5"),
            },
            BigUint::from(0u8),
        )?;

        assert!(receipt.is_success());
        assert_eq!(receipt.block_number, Some(1));
        assert_eq!(
            ledger.listings()?,
            vec![Listing::new(TokenId::from(1), ether("0.5"))]
        );
        assert_eq!(ledger.token(&TokenId::from(1)).map(|t| t.owner), Some(alice()));
        Ok(())
    }

    #[test]
    fn mint_with_zero_price_reverts() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new().build();

        let receipt = ledger.submit(
            alice(),
            ContractCall::Mint {
                recipient: alice(),
                price: BigUint::from(0u8),
            },
            BigUint::from(0u8),
        )?;

        assert_eq!(receipt.status, TxStatus::Reverted);
        assert_eq!(
            ledger.transactions()[0].revert_reason.as_deref(),
            Some("Price must be greater than zero")
        );
        assert!(ledger.listings()?.is_empty());
        Ok(())
    }

    #[test]
    fn buy_transfers_ownership_and_payment() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new()
            .add_token(alice(), ether("0.5"), true)
            .set_balance(bob(), ether("2"))
            .build();

        let receipt = ledger.submit(
            bob(),
            ContractCall::Buy {
                token_id: TokenId::from(1),
            },
            ether("0.5"),
        )?;

        assert!(receipt.is_success());
        assert_eq!(
            ledger.token(&TokenId::from(1)),
            Some(&TokenRecord {
                owner: bob(),
                price: ether("0.5"),
                for_sale: false,
            })
        );
        assert_eq!(ledger.balance_of(&bob()), ether("1.5"));
        assert_eq!(ledger.balance_of(&alice()), ether("0.5"));
        assert!(ledger.listings()?.is_empty());
        Ok(())
    }

    #[test]
    fn buy_below_asking_price_reverts() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new()
            .add_token(alice(), ether("0.5"), true)
            .set_balance(bob(), ether("2"))
            .build();

        let receipt = ledger.submit(
            bob(),
            ContractCall::Buy {
                token_id: TokenId::from(1),
            },
            ether("0.4"),
        )?;

        assert_eq!(receipt.status, TxStatus::Reverted);
        assert_eq!(ledger.balance_of(&bob()), ether("2"));
        assert_eq!(ledger.token(&TokenId::from(1)).map(|t| t.owner), Some(alice()));
        Ok(())
    }

    #[test]
    fn buy_token_not_for_sale_reverts() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new()
            .add_token(alice(), ether("0.5"), false)
            .set_balance(bob(), ether("2"))
            .build();

        ledger.submit(
            bob(),
            ContractCall::Buy {
                token_id: TokenId::from(1),
            },
            ether("0.5"),
        )?;

        assert_eq!(
            ledger.transactions()[0].revert_reason.as_deref(),
            Some("Token 1 is not for sale")
        );
        Ok(())
    }

    #[test]
    fn buy_without_funds_is_not_submitted() {
        let mut ledger = SimulatedLedgerBuilder::new()
            .add_token(alice(), ether("0.5"), true)
            .build();

        let err = ledger
            .submit(
                bob(),
                ContractCall::Buy {
                    token_id: TokenId::from(1),
                },
                ether("0.5"),
            )
            .unwrap_err();

        assert!(err.to_string().starts_with("Insufficient funds"));
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn list_requires_ownership() -> Result<()> {
        let mut ledger = SimulatedLedgerBuilder::new()
            .add_token(alice(), ether("0.5"), false)
            .build();

        let receipt = ledger.submit(
            bob(),
            ContractCall::ListForSale {
                token_id: TokenId::from(1),
                price: ether("1"),
            },
            BigUint::from(0u8),
        )?;
        assert_eq!(receipt.status, TxStatus::Reverted);

        let receipt = ledger.submit(
            alice(),
            ContractCall::ListForSale {
                token_id: TokenId::from_str("1")?,
                price: ether("1"),
            },
            BigUint::from(0u8),
        )?;
        assert!(receipt.is_success());
        assert_eq!(
            ledger.listings()?,
            vec![Listing::new(TokenId::from(1), ether("1"))]
        );
        Ok(())
    }

    #[test]
    fn rejected_transactions_are_not_recorded() {
        let mut ledger = SimulatedLedgerBuilder::new().build();
        ledger.set_reject_transactions(true);

        let err = ledger
            .submit(
                alice(),
                ContractCall::Mint {
                    recipient: alice(),
                    price: ether("1"),
                },
                BigUint::from(0u8),
            )
            .unwrap_err();

        assert!(err.downcast_ref::<WalletRejection>().is_some());
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn failing_reads_are_counted() {
        let mut ledger = SimulatedLedgerBuilder::new().build();
        ledger.set_fail_reads(true);

        let err = ledger.listings().unwrap_err();

        assert_eq!(err.to_string(), "Simulated read failure");
        assert_eq!(ledger.listing_reads(), 1);
    }
}
