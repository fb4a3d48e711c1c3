use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::market::{ChartDays, Coin, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices};
use super::traits::MarketDataProvider;

/// How requests reach CoinGecko.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// `{base}{path}?{query}`
    Direct(String),
    /// `{prefix}{urlencode(upstream + path + query)}`, for CORS-style
    /// forwarding proxies that take the target URL as their query.
    Proxied { prefix: String, upstream: String },
}

/// CoinGecko v3 API client.
///
/// - **Free**: no API key required, aggressive rate limits (HTTP 429).
/// - **Endpoints**: `/coins/markets`, `/coins/{id}/market_chart`,
///   `/coins/{id}`, `/search`, `/global`, `/simple/price`
///
/// One instance talks to one base URL. The market service owns retry
/// and fallback ordering across instances.
pub struct CoinGeckoProvider {
    client: Client,
    name: String,
    endpoint: Endpoint,
}

impl CoinGeckoProvider {
    /// Client that calls `base_url` directly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: build_client(),
            name: format!("CoinGecko ({})", host_of(&base_url)),
            endpoint: Endpoint::Direct(trim_base(base_url)),
        }
    }

    /// Client that routes every request through a forwarding proxy.
    pub fn proxied(proxy_prefix: impl Into<String>, upstream_base: impl Into<String>) -> Self {
        let prefix = proxy_prefix.into();
        Self {
            client: build_client(),
            name: format!("CoinGecko via {}", host_of(&prefix)),
            endpoint: Endpoint::Proxied {
                prefix,
                upstream: trim_base(upstream_base.into()),
            },
        }
    }

    /// Full request URL for `path` with query pairs.
    pub fn request_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let base = match &self.endpoint {
            Endpoint::Direct(base) => base,
            Endpoint::Proxied { upstream, .. } => upstream,
        };
        let mut url = format!("{base}{path}");
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        match &self.endpoint {
            Endpoint::Direct(_) => url,
            Endpoint::Proxied { prefix, .. } => format!("{prefix}{}", urlencoding::encode(&url)),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = self.request_url(path, query);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CoreError::RateLimited(self.name.clone()));
        }
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: self.name.clone(),
                message: format!("HTTP {status} for {path}"),
            });
        }

        resp.json().await.map_err(|e| CoreError::Api {
            provider: self.name.clone(),
            message: format!("Failed to parse {path}: {e}"),
        })
    }
}

fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', '?']).next().unwrap_or(rest)
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<CoinSearchHit>,
}

#[derive(Deserialize)]
struct GlobalResponse {
    data: GlobalMarketData,
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn top_coins(&self, count: usize, currency: &str) -> Result<Vec<Coin>, CoreError> {
        self.get_json(
            "/coins/markets",
            &[
                ("vs_currency", currency.to_string()),
                ("order", "market_cap_desc".into()),
                ("per_page", count.to_string()),
                ("page", "1".into()),
                ("sparkline", "false".into()),
                ("price_change_percentage", "1h,24h,7d".into()),
                ("locale", "en".into()),
            ],
        )
        .await
    }

    async fn market_chart(
        &self,
        coin_id: &str,
        days: ChartDays,
        currency: &str,
    ) -> Result<MarketChart, CoreError> {
        self.get_json(
            &format!("/coins/{}/market_chart", urlencoding::encode(coin_id)),
            &[
                ("vs_currency", currency.to_string()),
                ("days", days.to_string()),
                ("interval", days.interval().to_string()),
            ],
        )
        .await
    }

    async fn coin_details(&self, coin_id: &str) -> Result<Value, CoreError> {
        self.get_json(
            &format!("/coins/{}", urlencoding::encode(coin_id)),
            &[
                ("localization", "false".into()),
                ("tickers", "false".into()),
                ("market_data", "true".into()),
                ("community_data", "false".into()),
                ("developer_data", "false".into()),
                ("sparkline", "false".into()),
            ],
        )
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchHit>, CoreError> {
        let resp: SearchResponse = self.get_json("/search", &[("query", query.to_string())]).await?;
        Ok(resp.coins)
    }

    async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        let resp: GlobalResponse = self.get_json("/global", &[]).await?;
        Ok(resp.data)
    }

    async fn simple_prices(&self, ids: &[String], currency: &str) -> Result<SimplePrices, CoreError> {
        if ids.is_empty() {
            return Ok(SimplePrices::new());
        }
        self.get_json(
            "/simple/price",
            &[("ids", ids.join(",")), ("vs_currencies", currency.to_string())],
        )
        .await
    }
}
