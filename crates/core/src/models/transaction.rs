use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source or destination account of a TradFi/DeFi transfer.
///
/// The linked account kinds have their own variants; any other label
/// (an exchange name, say) is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountKind {
    Alpaca,
    PhantomWallet,
    Metamask,
    Other(String),
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Alpaca => write!(f, "alpaca"),
            AccountKind::PhantomWallet => write!(f, "phantom_wallet"),
            AccountKind::Metamask => write!(f, "metamask"),
            AccountKind::Other(label) => f.write_str(label),
        }
    }
}

impl From<String> for AccountKind {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "alpaca" => AccountKind::Alpaca,
            "phantom_wallet" => AccountKind::PhantomWallet,
            "metamask" => AccountKind::Metamask,
            _ => AccountKind::Other(s.trim().to_string()),
        }
    }
}

impl From<AccountKind> for String {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Other(label) => label,
            known => known.to_string(),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountKind::from(s.to_string()))
    }
}

/// Status of a transfer. No transition rules apply: the caller may set
/// any string, and only `completed` has a side effect (`completedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Other(status) => f.write_str(status),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => TransactionStatus::Pending,
            "completed" => TransactionStatus::Completed,
            "failed" => TransactionStatus::Failed,
            _ => TransactionStatus::Other(s.trim().to_string()),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Other(status) => status,
            known => known.to_string(),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TransactionStatus::from(s.to_string()))
    }
}

/// A transfer between brokerage and wallet accounts (`transactions` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub from: AccountKind,
    pub to: AccountKind,
    #[serde(rename = "amountUSD")]
    pub amount_usd: f64,
    pub status: TransactionStatus,
    pub tx_hash: Option<String>,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation payload; every field is required but parsed leniently so a
/// missing one is reported as a validation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTransaction {
    pub user_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Option<f64>,
}

/// Status update payload for `PATCH /api/transactions/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionUpdate {
    pub status: Option<String>,
    pub tx_hash: Option<String>,
}
