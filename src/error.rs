// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{TokenId, TxHash};
use thiserror::Error;

/// Why a session action failed.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("No wallet provider detected")]
    ProviderNotFound,

    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wallet did not expose any account")]
    NoAccounts,

    #[error("Wallet connection failed: {0:#}")]
    ConnectionFailed(anyhow::Error),

    #[error("Session is not connected to a wallet")]
    NotConnected,

    #[error("Transaction rejected by wallet: {0}")]
    TransactionRejected(String),

    #[error("Transaction {0} reverted")]
    TransactionReverted(TxHash),

    #[error("Transaction failed: {0:#}")]
    TransactionFailed(anyhow::Error),

    #[error("Failed to read listings: {0:#}")]
    ReadFailed(anyhow::Error),

    #[error("Token {0} is not in the current listing")]
    ListingNotFound(TokenId),

    #[error("Invalid price {input:?}: {reason}")]
    InvalidPrice { input: String, reason: String },

    #[error("Invalid token id {0:?}")]
    InvalidTokenId(String),
}

impl MarketError {
    /// True for failures caused by the user declining a wallet request.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            MarketError::ConnectionRejected(_) | MarketError::TransactionRejected(_)
        )
    }
}
