// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::WalletRejection;
use crate::api::common::{Address, Receipt, TxHash, TxStatus, Wei, strip_0x};
use anyhow::{Result, format_err};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

static RPC_ID: AtomicU64 = AtomicU64::new(1);

/// EIP-1193 code for a request the user declined.
const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    data: Option<serde_json::Value>,
}

/// An error object returned by the provider.
#[derive(Debug, Error)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CallRequest {
    to: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct TransactionRequest {
    from: String,
    to: String,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    transaction_hash: String,
    status: Option<String>,
    block_number: Option<String>,
}

/// JSON-RPC client for a wallet provider endpoint.
#[derive(Clone, Debug)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.request_optional(method, params)
            .await?
            .ok_or(format_err!("{} returned no result", method))
    }

    /// Like [RpcClient::request], but a `null` result is a valid answer.
    pub async fn request_optional<P, R>(&self, method: &str, params: P) -> Result<Option<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = RPC_ID.fetch_add(1, Ordering::Relaxed);
        debug!(id, method, url = %self.url, "sending JSON-RPC request");
        let payload = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format_err!("HTTP {} from {}", status, self.url));
        }

        let body: JsonRpcResponse<R> = response.json().await?;
        if let Some(error) = body.error {
            if error.code == USER_REJECTED_REQUEST {
                return Err(WalletRejection(error.message).into());
            }
            return Err(RpcError {
                code: error.code,
                message: error.message,
                data: error.data,
            }
            .into());
        }
        Ok(body.result)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let result: String = self.request("eth_chainId", Vec::<String>::new()).await?;
        parse_quantity(&result)
    }

    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        let accounts: Vec<String> = self
            .request("eth_requestAccounts", Vec::<String>::new())
            .await?;
        accounts
            .iter()
            .map(|account| Address::from_str(account))
            .collect()
    }

    /// Executes a read-only call against the latest block.
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let request = CallRequest {
            to: to.to_string(),
            data: format!("0x{}", hex::encode(data)),
        };
        let params = vec![serde_json::to_value(request)?, "latest".into()];
        let result: String = self.request("eth_call", params).await?;
        Ok(hex::decode(strip_0x(&result))?)
    }

    /// Asks the provider to sign and broadcast a transaction from `from`.
    pub async fn send_transaction(
        &self,
        from: &Address,
        to: &Address,
        data: &[u8],
        value: &Wei,
    ) -> Result<TxHash> {
        let request = TransactionRequest {
            from: from.to_string(),
            to: to.to_string(),
            data: format!("0x{}", hex::encode(data)),
            value: (*value != Wei::from(0u8)).then(|| format!("{:#x}", value)),
        };
        let result: String = self
            .request("eth_sendTransaction", vec![request])
            .await?;
        TxHash::from_str(&result)
    }

    /// Returns the receipt of a mined transaction, or `None` while it is pending.
    pub async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        let receipt: Option<ReceiptResponse> = self
            .request_optional("eth_getTransactionReceipt", vec![hash.to_string()])
            .await?;
        receipt.map(ReceiptResponse::into_receipt).transpose()
    }
}

impl ReceiptResponse {
    fn into_receipt(self) -> Result<Receipt> {
        let status = match self.status.as_deref() {
            None | Some("0x1") => TxStatus::Success,
            Some("0x0") => TxStatus::Reverted,
            Some(other) => return Err(format_err!("Unknown receipt status {}", other)),
        };
        let block_number = self
            .block_number
            .as_deref()
            .map(parse_quantity)
            .transpose()?;
        Ok(Receipt {
            transaction_hash: TxHash::from_str(&self.transaction_hash)?,
            status,
            block_number,
        })
    }
}

fn parse_quantity(input: &str) -> Result<u64> {
    let raw = strip_0x(input.trim());
    if raw.is_empty() {
        return Err(format_err!("Empty hex quantity"));
    }
    u64::from_str_radix(raw, 16)
        .map_err(|err| format_err!("Invalid hex quantity {}: {}", input, err))
}
