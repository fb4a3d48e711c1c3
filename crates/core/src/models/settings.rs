use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_PROXY_URL: &str = "https://corsproxy.io/?";

/// Runtime settings shared by every service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Solana JSON-RPC endpoint.
    pub solana_rpc_url: String,

    /// Primary market data endpoint.
    pub coingecko_base_url: String,

    /// Endpoints tried in order when the primary one is unreachable.
    pub coingecko_alternate_urls: Vec<String>,

    /// Prefix prepended to the full (URL-encoded) upstream URL for the proxy
    /// fallback. `None` disables the proxy tier.
    pub coingecko_proxy_url: Option<String>,

    /// Attempts per market endpoint before moving on.
    pub max_retries: u32,

    /// Base retry delay in milliseconds.
    pub retry_delay_ms: u64,

    /// Maximum number of transactions returned per user listing.
    pub transaction_limit: usize,

    /// Interval of the mock transaction feed in milliseconds.
    pub feed_interval_ms: u64,

    /// Optional provider credentials (e.g. "alpaca_key", "alpaca_secret").
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solana_rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            coingecko_base_url: DEFAULT_COINGECKO_URL.to_string(),
            coingecko_alternate_urls: vec!["https://coingecko.p.rapidapi.com/api/v3".to_string()],
            coingecko_proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            max_retries: 3,
            retry_delay_ms: 1000,
            transaction_limit: 10,
            feed_interval_ms: 3000,
            api_keys: HashMap::new(),
        }
    }
}
