use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Balance snapshot shown next to a watched wallet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub sol: f64,
    pub usd: f64,
}

/// A wallet on the watch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedWallet {
    pub address: String,
    pub nickname: Option<String>,
    pub balance: Option<WalletBalance>,
    pub last_activity: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl WatchedWallet {
    pub fn new(address: impl Into<String>, nickname: Option<String>) -> Self {
        Self {
            address: address.into(),
            nickname,
            balance: None,
            last_activity: None,
            is_active: false,
        }
    }
}

/// Payload for adding a wallet to the watch list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchWalletRequest {
    pub address: Option<String>,
    pub nickname: Option<String>,
}

/// Partial update to a watched wallet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletPatch {
    pub nickname: Option<String>,
    pub balance: Option<WalletBalance>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Kind of on-chain activity in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTxType {
    Buy,
    Sell,
    Mint,
    Transfer,
}

impl FeedTxType {
    pub const ALL: [FeedTxType; 4] = [
        FeedTxType::Buy,
        FeedTxType::Sell,
        FeedTxType::Mint,
        FeedTxType::Transfer,
    ];
}

impl std::fmt::Display for FeedTxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedTxType::Buy => write!(f, "buy"),
            FeedTxType::Sell => write!(f, "sell"),
            FeedTxType::Mint => write!(f, "mint"),
            FeedTxType::Transfer => write!(f, "transfer"),
        }
    }
}

impl std::str::FromStr for FeedTxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(FeedTxType::Buy),
            "sell" => Ok(FeedTxType::Sell),
            "mint" => Ok(FeedTxType::Mint),
            "transfer" => Ok(FeedTxType::Transfer),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// One entry of the live transaction feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTransaction {
    pub id: String,
    pub wallet_address: String,
    #[serde(rename = "type")]
    pub tx_type: FeedTxType,
    pub token_symbol: String,
    pub token_name: Option<String>,
    pub amount: f64,
    pub usd_value: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub solscan_link: Option<String>,
}

/// Filters applied to the recent feed. Empty filter matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedFilter {
    pub wallet_address: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<FeedTxType>,
    pub token_symbol: Option<String>,
    pub min_usd: Option<f64>,
}

impl FeedFilter {
    pub fn matches(&self, tx: &FeedTransaction) -> bool {
        if let Some(addr) = &self.wallet_address {
            if &tx.wallet_address != addr {
                return false;
            }
        }
        if let Some(t) = self.tx_type {
            if tx.tx_type != t {
                return false;
            }
        }
        if let Some(sym) = &self.token_symbol {
            if !tx.token_symbol.eq_ignore_ascii_case(sym) {
                return false;
            }
        }
        if let Some(min) = self.min_usd {
            if tx.usd_value.unwrap_or(0.0) < min {
                return false;
            }
        }
        true
    }
}
