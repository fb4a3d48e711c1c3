use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::brokerage::{BrokerageAccount, BrokeragePosition};
use crate::models::market::{ChartDays, Coin, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices};

/// Abstraction over crypto market data sources.
///
/// The CoinGecko client (direct and via proxy) and the static mock source
/// all implement this trait, so the market service can walk them as tiers
/// without knowing which one answers.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Top `count` coins by market cap, priced in `currency`.
    async fn top_coins(&self, count: usize, currency: &str) -> Result<Vec<Coin>, CoreError>;

    /// Price/market-cap/volume history for one coin.
    async fn market_chart(
        &self,
        coin_id: &str,
        days: ChartDays,
        currency: &str,
    ) -> Result<MarketChart, CoreError>;

    /// Full detail document for one coin (passed through untouched).
    async fn coin_details(&self, coin_id: &str) -> Result<Value, CoreError>;

    /// Free-text coin search.
    async fn search(&self, query: &str) -> Result<Vec<CoinSearchHit>, CoreError>;

    /// Aggregate market statistics.
    async fn global(&self) -> Result<GlobalMarketData, CoreError>;

    /// Spot prices for a set of coin ids.
    async fn simple_prices(&self, ids: &[String], currency: &str) -> Result<SimplePrices, CoreError>;
}

/// Abstraction over a brokerage account (TradFi side of the portfolio).
#[async_trait]
pub trait BrokerageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn positions(&self) -> Result<Vec<BrokeragePosition>, CoreError>;

    async fn account(&self) -> Result<BrokerageAccount, CoreError>;
}
