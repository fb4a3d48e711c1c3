use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::CoreError;

use super::address::address_to_bytes;

/// A parsed SPL token account as reported by `getTokenAccountsByOwner`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccount {
    pub mint: String,
    pub amount: u64,
    pub decimals: u8,
    pub ui_amount: f64,
}

/// The subset of the Solana JSON-RPC API the wallet layer needs.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &str) -> Result<u64, CoreError>;

    /// Token accounts owned by `owner` under the given token program.
    async fn get_token_accounts(
        &self,
        owner: &str,
        program_id: &str,
    ) -> Result<Vec<TokenAccount>, CoreError>;

    /// A recent blockhash to anchor a new transaction.
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], CoreError>;

    /// Submit a signed wire transaction. Returns the base58 signature.
    async fn send_transaction(&self, wire: &[u8]) -> Result<String, CoreError>;
}

/// JSON-RPC 2.0 client over HTTP.
pub struct HttpSolanaRpc {
    client: Client,
    url: String,
}

impl HttpSolanaRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, CoreError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Rpc(format!("{method}: unreadable response: {e}")))?;

        if let Some(err) = resp.error {
            return Err(CoreError::Rpc(format!("{method}: {} (code {})", err.message, err.code)));
        }
        resp.result
            .ok_or_else(|| CoreError::Rpc(format!("{method}: response has no result")))
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ParsedTokenAmount {
    amount: String,
    decimals: u8,
    #[serde(rename = "uiAmount")]
    ui_amount: Option<f64>,
}

#[async_trait]
impl SolanaRpc for HttpSolanaRpc {
    async fn get_balance(&self, address: &str) -> Result<u64, CoreError> {
        let result = self.call("getBalance", json!([address])).await?;
        result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| CoreError::Rpc("getBalance: missing value".into()))
    }

    async fn get_token_accounts(
        &self,
        owner: &str,
        program_id: &str,
    ) -> Result<Vec<TokenAccount>, CoreError> {
        let result = self
            .call(
                "getTokenAccountsByOwner",
                json!([owner, { "programId": program_id }, { "encoding": "jsonParsed" }]),
            )
            .await?;

        let accounts = result
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::Rpc("getTokenAccountsByOwner: missing value".into()))?;

        let parsed = accounts
            .iter()
            .filter_map(|acct| {
                let info = acct.pointer("/account/data/parsed/info")?;
                let mint = info.get("mint")?.as_str()?.to_string();
                let amount: ParsedTokenAmount =
                    serde_json::from_value(info.get("tokenAmount")?.clone()).ok()?;
                let raw = amount.amount.parse::<u64>().ok()?;
                let ui_amount = amount
                    .ui_amount
                    .unwrap_or_else(|| raw as f64 / 10f64.powi(amount.decimals as i32));
                Some(TokenAccount {
                    mint,
                    amount: raw,
                    decimals: amount.decimals,
                    ui_amount,
                })
            })
            .collect();

        Ok(parsed)
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], CoreError> {
        let result = self
            .call("getLatestBlockhash", json!([{ "commitment": "finalized" }]))
            .await?;
        let hash = result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Rpc("getLatestBlockhash: missing blockhash".into()))?;
        address_to_bytes(hash).map_err(|e| CoreError::Rpc(format!("bad blockhash: {e}")))
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, CoreError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        let result = self
            .call(
                "sendTransaction",
                json!([encoded, { "encoding": "base64", "preflightCommitment": "confirmed" }]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CoreError::Rpc("sendTransaction: signature missing".into()))
    }
}
