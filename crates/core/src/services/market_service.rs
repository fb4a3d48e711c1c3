use log::{error, info, warn};
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::market::{
    ChartDays, Coin, CoinDetails, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices,
};
use crate::models::settings::Settings;
use crate::providers::mock_market::MockMarketProvider;
use crate::providers::registry::MarketProviderRegistry;
use crate::providers::traits::MarketDataProvider;
use crate::solana::tokens::coingecko_id_for_symbol;

/// Retry behaviour of the direct provider tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_retries: settings.max_retries.max(1),
            base_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// One market operation, dispatched against any provider.
#[derive(Debug, Clone, Copy)]
enum MarketRequest<'a> {
    TopCoins { count: usize, currency: &'a str },
    Chart { coin_id: &'a str, days: ChartDays, currency: &'a str },
    Details { coin_id: &'a str },
    Search { query: &'a str },
    Global,
    SimplePrices { ids: &'a [String], currency: &'a str },
}

impl MarketRequest<'_> {
    fn label(&self) -> String {
        match self {
            MarketRequest::TopCoins { count, .. } => format!("top {count} coins"),
            MarketRequest::Chart { coin_id, days, .. } => format!("{days}d chart for {coin_id}"),
            MarketRequest::Details { coin_id } => format!("details for {coin_id}"),
            MarketRequest::Search { query } => format!("search '{query}'"),
            MarketRequest::Global => "global data".to_string(),
            MarketRequest::SimplePrices { ids, .. } => format!("prices for {}", ids.join(",")),
        }
    }
}

enum MarketResponse {
    TopCoins(Vec<Coin>),
    Chart(MarketChart),
    Details(CoinDetails),
    Search(Vec<CoinSearchHit>),
    Global(GlobalMarketData),
    SimplePrices(SimplePrices),
}

impl MarketResponse {
    /// Whether a successful response actually carries data worth returning.
    /// Empty coin lists and charts fall through to the next tier.
    fn is_usable(&self) -> bool {
        match self {
            MarketResponse::TopCoins(coins) => !coins.is_empty(),
            MarketResponse::Chart(chart) => !chart.is_empty(),
            MarketResponse::Details(details) => details.get("id").is_some(),
            MarketResponse::Search(_) | MarketResponse::Global(_) => true,
            MarketResponse::SimplePrices(prices) => !prices.is_empty(),
        }
    }
}

async fn dispatch(
    provider: &dyn MarketDataProvider,
    request: MarketRequest<'_>,
) -> Result<MarketResponse, CoreError> {
    Ok(match request {
        MarketRequest::TopCoins { count, currency } => {
            MarketResponse::TopCoins(provider.top_coins(count, currency).await?)
        }
        MarketRequest::Chart { coin_id, days, currency } => {
            MarketResponse::Chart(provider.market_chart(coin_id, days, currency).await?)
        }
        MarketRequest::Details { coin_id } => {
            MarketResponse::Details(provider.coin_details(coin_id).await?)
        }
        MarketRequest::Search { query } => MarketResponse::Search(provider.search(query).await?),
        MarketRequest::Global => MarketResponse::Global(provider.global().await?),
        MarketRequest::SimplePrices { ids, currency } => {
            MarketResponse::SimplePrices(provider.simple_prices(ids, currency).await?)
        }
    })
}

/// Crypto market data with layered fallback.
///
/// 1. Direct tier: up to `max_retries` attempts. HTTP 429 sleeps
///    `delay * attempt` and retries the same endpoint; a network error
///    sleeps `delay` and rotates to the next registered endpoint. Any
///    other error ends the tier.
/// 2. Fallback tier (proxies): one attempt each.
/// 3. Static mock data.
///
/// Public lookups therefore never fail; every fallback is logged.
pub struct MarketService {
    registry: MarketProviderRegistry,
    retry: RetryPolicy,
    mock: MockMarketProvider,
}

impl MarketService {
    pub fn new(registry: MarketProviderRegistry, retry: RetryPolicy) -> Self {
        Self {
            registry,
            retry,
            mock: MockMarketProvider::new(),
        }
    }

    /// Names of the live providers, in the order they are tried.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .direct_providers()
            .into_iter()
            .chain(self.registry.fallback_providers())
            .map(|p| p.name().to_string())
            .collect()
    }

    pub async fn get_top_coins(&self, count: usize, currency: &str) -> Vec<Coin> {
        let request = MarketRequest::TopCoins { count, currency };
        match self.fetch_or_mock(request).await {
            MarketResponse::TopCoins(coins) => coins,
            _ => Vec::new(),
        }
    }

    pub async fn get_market_chart(&self, coin_id: &str, days: ChartDays, currency: &str) -> MarketChart {
        let request = MarketRequest::Chart { coin_id, days, currency };
        match self.fetch_or_mock(request).await {
            MarketResponse::Chart(chart) => chart,
            _ => MarketChart::default(),
        }
    }

    pub async fn get_coin_details(&self, coin_id: &str) -> CoinDetails {
        let request = MarketRequest::Details { coin_id };
        match self.fetch_or_mock(request).await {
            MarketResponse::Details(details) => details,
            _ => CoinDetails::Null,
        }
    }

    pub async fn search_coins(&self, query: &str) -> Vec<CoinSearchHit> {
        let request = MarketRequest::Search { query };
        match self.fetch_or_mock(request).await {
            MarketResponse::Search(hits) => hits,
            _ => Vec::new(),
        }
    }

    pub async fn get_global_data(&self) -> GlobalMarketData {
        match self.fetch_or_mock(MarketRequest::Global).await {
            MarketResponse::Global(data) => data,
            _ => GlobalMarketData::default(),
        }
    }

    pub async fn get_simple_prices(&self, ids: &[String], currency: &str) -> SimplePrices {
        let request = MarketRequest::SimplePrices { ids, currency };
        match self.fetch_or_mock(request).await {
            MarketResponse::SimplePrices(prices) => prices,
            _ => SimplePrices::new(),
        }
    }

    /// USD price per token symbol, for valuing wallet holdings.
    ///
    /// Live sources only: a symbol with no known CoinGecko id or no live
    /// quote is priced at 0 rather than at a mock value.
    pub async fn token_prices(&self, symbols: &[String]) -> HashMap<String, f64> {
        let mut id_by_symbol = HashMap::new();
        for symbol in symbols {
            if let Some(id) = coingecko_id_for_symbol(symbol) {
                id_by_symbol.insert(symbol.clone(), id.to_string());
            }
        }

        let mut ids: Vec<String> = id_by_symbol.values().cloned().collect();
        ids.sort();
        ids.dedup();

        let quotes = if ids.is_empty() {
            SimplePrices::new()
        } else {
            let request = MarketRequest::SimplePrices { ids: &ids, currency: "usd" };
            match self.fetch_live(request).await {
                Ok(MarketResponse::SimplePrices(prices)) => prices,
                Ok(_) => SimplePrices::new(),
                Err(e) => {
                    warn!("Token prices unavailable, valuing at 0: {e}");
                    SimplePrices::new()
                }
            }
        };

        symbols
            .iter()
            .map(|symbol| {
                let price = id_by_symbol
                    .get(symbol)
                    .and_then(|id| quotes.get(id))
                    .and_then(|q| q.get("usd"))
                    .copied()
                    .unwrap_or(0.0);
                (symbol.clone(), price)
            })
            .collect()
    }

    async fn fetch_or_mock(&self, request: MarketRequest<'_>) -> MarketResponse {
        match self.fetch_live(request).await {
            Ok(resp) => resp,
            Err(e) => {
                info!("All live market sources failed for {}, serving mock data: {e}", request.label());
                match dispatch(&self.mock, request).await {
                    Ok(resp) => resp,
                    Err(mock_err) => {
                        error!("Mock market data failed for {}: {mock_err}", request.label());
                        MarketResponse::Search(Vec::new())
                    }
                }
            }
        }
    }

    /// Direct tier with retries, then each fallback provider once.
    async fn fetch_live(&self, request: MarketRequest<'_>) -> Result<MarketResponse, CoreError> {
        let mut last_error = match self.fetch_direct(request).await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                error!("Direct market API call failed for {}: {e}", request.label());
                e
            }
        };

        for provider in self.registry.fallback_providers() {
            match dispatch(provider, request).await {
                Ok(resp) if resp.is_usable() => return Ok(resp),
                Ok(_) => {
                    last_error = CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("empty response for {}", request.label()),
                    };
                }
                Err(e) => {
                    error!("{} fallback failed for {}: {e}", provider.name(), request.label());
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch_direct(&self, request: MarketRequest<'_>) -> Result<MarketResponse, CoreError> {
        let providers = self.registry.direct_providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider("market data".into()));
        }

        let max = self.retry.max_retries;
        let mut current = 0usize;
        let mut attempt = 0u32;
        let mut last_error = None;

        while attempt < max {
            let provider = providers[current];
            match dispatch(provider, request).await {
                Ok(resp) if resp.is_usable() => return Ok(resp),
                Ok(_) => {
                    return Err(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("empty response for {}", request.label()),
                    })
                }
                Err(e @ CoreError::RateLimited(_)) => {
                    attempt += 1;
                    warn!("Rate limited, retrying ({attempt}/{max})...");
                    last_error = Some(e);
                    if attempt < max {
                        tokio::time::sleep(self.retry.base_delay * attempt).await;
                    }
                }
                Err(e @ CoreError::Network(_)) => {
                    attempt += 1;
                    warn!("Network error on {}, trying alternative endpoint ({attempt}/{max})...", provider.name());
                    last_error = Some(e);
                    if current + 1 < providers.len() {
                        current += 1;
                    }
                    if attempt < max {
                        tokio::time::sleep(self.retry.base_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider("market data".into())))
    }
}
