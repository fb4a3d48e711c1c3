use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::brokerage::{BrokerageAccount, BrokeragePosition};
use super::traits::BrokerageProvider;

const PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets/v2";

/// Alpaca brokerage API (paper trading endpoint).
///
/// - **Auth**: `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY` headers
/// - **Endpoints**: `/positions`, `/account`
///
/// Alpaca encodes every decimal as a JSON string; they are parsed here.
pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    key_id: String,
    secret_key: String,
}

impl AlpacaProvider {
    pub fn new(key_id: String, secret_key: String) -> Self {
        Self::with_base_url(PAPER_BASE_URL, key_id, secret_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, key_id: String, secret_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id,
            secret_key,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("APCA-API-KEY-ID", &self.key_id)
            .header("APCA-API-SECRET-KEY", &self.secret_key)
            .send()
            .await?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(CoreError::RateLimited("Alpaca".into())),
            s if !s.is_success() => {
                return Err(CoreError::Api {
                    provider: "Alpaca".into(),
                    message: format!("HTTP {s} for {path}"),
                })
            }
            _ => {}
        }

        resp.json().await.map_err(|e| CoreError::Api {
            provider: "Alpaca".into(),
            message: format!("Failed to parse {path}: {e}"),
        })
    }
}

// ── Alpaca API response types ───────────────────────────────────────

#[derive(Deserialize)]
struct RawPosition {
    symbol: String,
    qty: String,
    #[serde(default)]
    market_value: Option<String>,
    #[serde(default)]
    current_price: Option<String>,
    #[serde(default)]
    change_today: Option<String>,
    #[serde(default)]
    unrealized_pl: Option<String>,
    #[serde(default)]
    unrealized_plpc: Option<String>,
    #[serde(default)]
    asset_class: String,
}

#[derive(Deserialize)]
struct RawAccount {
    id: String,
    equity: String,
    cash: String,
    buying_power: String,
    portfolio_value: String,
}

fn num(field: &str, raw: &str) -> Result<f64, CoreError> {
    raw.parse().map_err(|e| CoreError::Api {
        provider: "Alpaca".into(),
        message: format!("Invalid number in {field}: {e}"),
    })
}

fn opt_num(field: &str, raw: Option<&str>) -> Result<f64, CoreError> {
    raw.map_or(Ok(0.0), |r| num(field, r))
}

impl TryFrom<RawPosition> for BrokeragePosition {
    type Error = CoreError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Ok(BrokeragePosition {
            qty: num("qty", &raw.qty)?,
            market_value: opt_num("market_value", raw.market_value.as_deref())?,
            current_price: opt_num("current_price", raw.current_price.as_deref())?,
            change_today: opt_num("change_today", raw.change_today.as_deref())?,
            unrealized_pl: opt_num("unrealized_pl", raw.unrealized_pl.as_deref())?,
            unrealized_plpc: opt_num("unrealized_plpc", raw.unrealized_plpc.as_deref())?,
            asset_class: raw.asset_class,
            symbol: raw.symbol,
        })
    }
}

#[async_trait]
impl BrokerageProvider for AlpacaProvider {
    fn name(&self) -> &str {
        "Alpaca"
    }

    async fn positions(&self) -> Result<Vec<BrokeragePosition>, CoreError> {
        let raw: Vec<RawPosition> = self.get("/positions").await?;
        raw.into_iter().map(BrokeragePosition::try_from).collect()
    }

    async fn account(&self) -> Result<BrokerageAccount, CoreError> {
        let raw: RawAccount = self.get("/account").await?;
        Ok(BrokerageAccount {
            equity: num("equity", &raw.equity)?,
            cash: num("cash", &raw.cash)?,
            buying_power: num("buying_power", &raw.buying_power)?,
            portfolio_value: num("portfolio_value", &raw.portfolio_value)?,
            id: raw.id,
        })
    }
}

/// Fixed brokerage snapshot used when no Alpaca credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct MockBrokerageProvider;

impl MockBrokerageProvider {
    pub fn new() -> Self {
        Self
    }
}

fn position(symbol: &str, qty: f64, value: f64, price: f64, change: f64, pl: f64, plpc: f64) -> BrokeragePosition {
    BrokeragePosition {
        symbol: symbol.into(),
        qty,
        market_value: value,
        current_price: price,
        change_today: change,
        unrealized_pl: pl,
        unrealized_plpc: plpc,
        asset_class: "us_equity".into(),
    }
}

#[async_trait]
impl BrokerageProvider for MockBrokerageProvider {
    fn name(&self) -> &str {
        "Mock brokerage"
    }

    async fn positions(&self) -> Result<Vec<BrokeragePosition>, CoreError> {
        Ok(vec![
            position("AAPL", 10.0, 1750.50, 175.05, 0.0125, 250.50, 0.1669),
            position("MSFT", 5.0, 2000.75, 400.15, -0.0075, 175.25, 0.0959),
            position("AMZN", 3.0, 525.30, 175.10, 0.0225, 45.90, 0.0956),
        ])
    }

    async fn account(&self) -> Result<BrokerageAccount, CoreError> {
        Ok(BrokerageAccount {
            id: "mock-account-id".into(),
            equity: 5276.55,
            cash: 1000.00,
            buying_power: 2000.00,
            portfolio_value: 4276.55,
        })
    }
}
