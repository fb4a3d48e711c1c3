use serde::{Deserialize, Serialize};

/// Exported keypair, both halves base58-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypairJson {
    pub public_key: String,
    pub secret_key: String,
}

/// Result of `POST /api/solana/generate-wallet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWallet {
    pub public_key: String,
    /// `KeypairJson` serialized as a JSON string.
    pub keypair_json: String,
}

/// One SPL token account balance owned by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub mint: String,
    /// Raw amount in base units.
    pub amount: u64,
    pub decimals: u8,
    /// `amount / 10^decimals`.
    pub ui_amount: f64,
    pub symbol: String,
}
