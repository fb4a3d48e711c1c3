use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A coin row from the markets listing, ordered by market cap.
///
/// Numeric fields are optional because upstream regularly reports `null`
/// for supplies and ATH data on young coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default)]
    pub atl: Option<f64>,
    #[serde(default)]
    pub atl_change_percentage: Option<f64>,
    #[serde(default)]
    pub atl_date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
}

/// Historical series, each point `[unix_millis, value]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub market_caps: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

impl MarketChart {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Requested chart span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartDays {
    Days(u32),
    Max,
}

impl ChartDays {
    /// Sampling interval requested upstream for this span.
    pub fn interval(&self) -> &'static str {
        match self {
            ChartDays::Days(1) | ChartDays::Days(7) => "hourly",
            ChartDays::Days(30) | ChartDays::Days(90) => "daily",
            ChartDays::Days(365) | ChartDays::Max => "weekly",
            ChartDays::Days(_) => "daily",
        }
    }

    /// Number of daily points a synthetic chart for this span carries.
    pub fn point_count(&self) -> usize {
        match self {
            ChartDays::Max => 365,
            ChartDays::Days(0) => 7,
            ChartDays::Days(n) => *n as usize,
        }
    }
}

impl Default for ChartDays {
    fn default() -> Self {
        ChartDays::Days(7)
    }
}

impl std::fmt::Display for ChartDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartDays::Days(n) => write!(f, "{n}"),
            ChartDays::Max => write!(f, "max"),
        }
    }
}

impl std::str::FromStr for ChartDays {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(ChartDays::Max);
        }
        trimmed
            .parse::<u32>()
            .map(ChartDays::Days)
            .map_err(|_| format!("invalid days '{trimmed}' (expected a number or 'max')"))
    }
}

/// A hit from the coin search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSearchHit {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Aggregate crypto market statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalMarketData {
    pub active_cryptocurrencies: Option<u64>,
    pub upcoming_icos: Option<u64>,
    pub ongoing_icos: Option<u64>,
    pub ended_icos: Option<u64>,
    pub markets: Option<u64>,
    pub total_market_cap: HashMap<String, f64>,
    pub total_volume: HashMap<String, f64>,
    pub market_cap_percentage: HashMap<String, f64>,
    pub market_cap_change_percentage_24h_usd: Option<f64>,
    pub updated_at: Option<i64>,
}

/// Full coin document, passed through as returned upstream.
pub type CoinDetails = serde_json::Value;

/// `coin id → (currency → price)`.
pub type SimplePrices = HashMap<String, HashMap<String, f64>>;
