use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chain family of a wallet linked to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    Solana,
    Eth,
}

impl std::fmt::Display for WalletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletType::Solana => write!(f, "solana"),
            WalletType::Eth => write!(f, "eth"),
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solana" | "sol" => Ok(WalletType::Solana),
            "eth" | "ethereum" => Ok(WalletType::Eth),
            other => Err(format!("unknown wallet type '{other}'")),
        }
    }
}

/// A wallet address attached to a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedWallet {
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    pub address: String,
}

/// A user document (`users` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub plaid_linked: bool,
    pub alpaca_linked: bool,
    pub wallets: Vec<LinkedWallet>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl User {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid: uid.into(),
            email: email.into(),
            plaid_linked: false,
            alpaca_linked: false,
            wallets: Vec::new(),
            created_at: now,
            last_login: now,
        }
    }

    /// Addresses of every linked wallet of the given type.
    pub fn wallets_of(&self, wallet_type: WalletType) -> impl Iterator<Item = &str> {
        self.wallets
            .iter()
            .filter(move |w| w.wallet_type == wallet_type)
            .map(|w| w.address.as_str())
    }
}

/// Signup payload. Fields are optional so missing ones surface as
/// validation errors instead of body rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub uid: Option<String>,
    pub email: Option<String>,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub alpaca_linked: Option<bool>,
    pub plaid_linked: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.alpaca_linked.is_none() && self.plaid_linked.is_none()
    }
}

/// Payload for linking a wallet to a profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkWalletRequest {
    #[serde(rename = "type")]
    pub wallet_type: Option<String>,
    pub address: Option<String>,
}
