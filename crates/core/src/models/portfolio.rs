use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Combined TradFi/DeFi holdings of one user (`portfolios` collection,
/// keyed by user id).
///
/// Rebuilt from scratch on every sync; there is no incremental update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub user_id: String,

    /// Brokerage positions: symbol → quantity.
    pub alpaca_holdings: HashMap<String, f64>,

    /// On-chain balances: token symbol → amount (UI units).
    pub defi_holdings: HashMap<String, f64>,

    /// USD value of the brokerage side at last sync.
    #[serde(rename = "tradfiEquityUSD")]
    pub tradfi_equity_usd: f64,

    /// USD value of the on-chain side at last sync.
    #[serde(rename = "defiEquityUSD")]
    pub defi_equity_usd: f64,

    #[serde(rename = "totalEquityUSD")]
    pub total_equity_usd: f64,

    pub last_updated: DateTime<Utc>,
}

impl Portfolio {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            alpaca_holdings: HashMap::new(),
            defi_holdings: HashMap::new(),
            tradfi_equity_usd: 0.0,
            defi_equity_usd: 0.0,
            total_equity_usd: 0.0,
            last_updated: Utc::now(),
        }
    }
}

/// Payload for writing a portfolio document directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioWrite {
    pub alpaca_holdings: Option<HashMap<String, f64>>,
    pub defi_holdings: Option<HashMap<String, f64>>,
    #[serde(rename = "tradfiEquityUSD")]
    pub tradfi_equity_usd: Option<f64>,
    #[serde(rename = "defiEquityUSD")]
    pub defi_equity_usd: Option<f64>,
    #[serde(rename = "totalEquityUSD")]
    pub total_equity_usd: Option<f64>,
}

/// TradFi vs DeFi split as whole percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub tradfi: f64,
    pub defi: f64,
}
