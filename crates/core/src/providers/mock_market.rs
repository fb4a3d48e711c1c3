use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::market::{ChartDays, Coin, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices};
use super::traits::MarketDataProvider;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Static market data served when every live source has failed.
///
/// Never errors. Prices are a fixed snapshot of three large caps; charts
/// are a fresh random walk on each call.
#[derive(Debug, Clone, Default)]
pub struct MockMarketProvider;

impl MockMarketProvider {
    pub fn new() -> Self {
        Self
    }
}

/// The fixed coin snapshot: bitcoin, ethereum, solana.
pub fn mock_top_coins() -> Vec<Coin> {
    let now = Utc::now().to_rfc3339();
    vec![
        Coin {
            id: "bitcoin".into(),
            symbol: "btc".into(),
            name: "Bitcoin".into(),
            image: Some("https://assets.coingecko.com/coins/images/1/large/bitcoin.png".into()),
            current_price: Some(55225.0),
            market_cap: Some(1_084_057_024_018.0),
            market_cap_rank: Some(1),
            fully_diluted_valuation: Some(1_160_725_230_123.0),
            total_volume: Some(46_891_415_269.0),
            high_24h: Some(56800.0),
            low_24h: Some(54200.0),
            price_change_24h: Some(1025.0),
            price_change_percentage_24h: Some(1.89),
            market_cap_change_24h: Some(20_057_024_018.0),
            market_cap_change_percentage_24h: Some(1.89),
            circulating_supply: Some(19_318_118.0),
            total_supply: Some(21_000_000.0),
            max_supply: Some(21_000_000.0),
            ath: Some(69045.0),
            ath_change_percentage: Some(-20.01),
            ath_date: Some("2021-11-10T14:24:11.849Z".into()),
            atl: Some(67.81),
            atl_change_percentage: Some(81344.36),
            atl_date: Some("2013-07-06T00:00:00.000Z".into()),
            last_updated: Some(now.clone()),
            price_change_percentage_1h_in_currency: Some(0.15),
            price_change_percentage_24h_in_currency: Some(1.89),
            price_change_percentage_7d_in_currency: Some(5.23),
        },
        Coin {
            id: "ethereum".into(),
            symbol: "eth".into(),
            name: "Ethereum".into(),
            image: Some("https://assets.coingecko.com/coins/images/279/large/ethereum.png".into()),
            current_price: Some(3050.12),
            market_cap: Some(366_880_000_000.0),
            market_cap_rank: Some(2),
            fully_diluted_valuation: Some(366_880_000_000.0),
            total_volume: Some(21_500_000_000.0),
            high_24h: Some(3100.0),
            low_24h: Some(2980.0),
            price_change_24h: Some(70.12),
            price_change_percentage_24h: Some(2.35),
            market_cap_change_24h: Some(8_620_000_000.0),
            market_cap_change_percentage_24h: Some(2.35),
            circulating_supply: Some(120_250_000.0),
            total_supply: Some(120_250_000.0),
            max_supply: None,
            ath: Some(4878.26),
            ath_change_percentage: Some(-37.48),
            ath_date: Some("2021-11-10T14:24:19.604Z".into()),
            atl: Some(0.432979),
            atl_change_percentage: Some(704555.24),
            atl_date: Some("2015-10-20T00:00:00.000Z".into()),
            last_updated: Some(now.clone()),
            price_change_percentage_1h_in_currency: Some(0.12),
            price_change_percentage_24h_in_currency: Some(2.35),
            price_change_percentage_7d_in_currency: Some(3.45),
        },
        Coin {
            id: "solana".into(),
            symbol: "sol".into(),
            name: "Solana".into(),
            image: Some("https://assets.coingecko.com/coins/images/4128/large/solana.png".into()),
            current_price: Some(132.56),
            market_cap: Some(58_450_000_000.0),
            market_cap_rank: Some(5),
            fully_diluted_valuation: Some(73_200_000_000.0),
            total_volume: Some(2_850_000_000.0),
            high_24h: Some(135.0),
            low_24h: Some(128.5),
            price_change_24h: Some(4.06),
            price_change_percentage_24h: Some(3.16),
            market_cap_change_24h: Some(1_790_000_000.0),
            market_cap_change_percentage_24h: Some(3.16),
            circulating_supply: Some(441_000_000.0),
            total_supply: Some(551_000_000.0),
            max_supply: None,
            ath: Some(259.96),
            ath_change_percentage: Some(-49.01),
            ath_date: Some("2021-11-06T21:54:35.825Z".into()),
            atl: Some(0.500801),
            atl_change_percentage: Some(26370.97),
            atl_date: Some("2020-05-11T19:35:23.449Z".into()),
            last_updated: Some(now),
            price_change_percentage_1h_in_currency: Some(0.22),
            price_change_percentage_24h_in_currency: Some(3.16),
            price_change_percentage_7d_in_currency: Some(8.59),
        },
    ]
}

/// One point per day ending now, price moving at most ±2.5% per step.
pub fn mock_market_chart(days: ChartDays) -> MarketChart {
    let points = days.point_count();
    let mut rng = rand::thread_rng();
    let now = Utc::now().timestamp_millis();

    let mut price = 50_000.0 + rng.gen::<f64>() * 10_000.0;
    let mut chart = MarketChart {
        prices: Vec::with_capacity(points),
        market_caps: Vec::with_capacity(points),
        total_volumes: Vec::with_capacity(points),
    };

    for i in 0..points {
        let timestamp = (now - (points - i) as i64 * MILLIS_PER_DAY) as f64;
        let change = (rng.gen::<f64>() - 0.5) * 0.05;
        price *= 1.0 + change;
        let volume = 50_000_000_000.0 + rng.gen::<f64>() * 10_000_000_000.0;

        chart.prices.push([timestamp, price]);
        chart.market_caps.push([timestamp, price * 19_000_000.0]);
        chart.total_volumes.push([timestamp, volume]);
    }
    chart
}

/// Aggregate statistics snapshot.
pub fn mock_global_data() -> GlobalMarketData {
    let map = |pairs: &[(&str, f64)]| -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    };
    GlobalMarketData {
        active_cryptocurrencies: Some(17088),
        upcoming_icos: Some(0),
        ongoing_icos: Some(49),
        ended_icos: Some(3376),
        markets: Some(892),
        total_market_cap: map(&[
            ("btc", 41_282_000.0),
            ("eth", 652_340_000.0),
            ("ltc", 16_420_000_000.0),
            ("usd", 2_280_000_000_000.0),
        ]),
        total_volume: map(&[
            ("btc", 1_790_000.0),
            ("eth", 28_200_000.0),
            ("ltc", 711_000_000.0),
            ("usd", 98_700_000_000.0),
        ]),
        market_cap_percentage: map(&[
            ("btc", 47.5),
            ("eth", 16.1),
            ("usdt", 4.2),
            ("bnb", 2.6),
            ("sol", 2.5),
            ("xrp", 2.1),
            ("usdc", 2.0),
            ("steth", 1.1),
            ("ada", 0.9),
            ("avax", 0.8),
        ]),
        market_cap_change_percentage_24h_usd: Some(1.23),
        updated_at: Some(Utc::now().timestamp_millis()),
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn top_coins(&self, count: usize, _currency: &str) -> Result<Vec<Coin>, CoreError> {
        let mut coins = mock_top_coins();
        coins.truncate(count.max(1));
        Ok(coins)
    }

    async fn market_chart(
        &self,
        _coin_id: &str,
        days: ChartDays,
        _currency: &str,
    ) -> Result<MarketChart, CoreError> {
        Ok(mock_market_chart(days))
    }

    /// Matching snapshot coin, or bitcoin when the id is unknown.
    async fn coin_details(&self, coin_id: &str) -> Result<Value, CoreError> {
        let mut coins = mock_top_coins();
        let idx = coins.iter().position(|c| c.id == coin_id).unwrap_or(0);
        Ok(serde_json::to_value(coins.swap_remove(idx))?)
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchHit>, CoreError> {
        let needle = query.to_lowercase();
        Ok(mock_top_coins()
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle) || c.symbol.to_lowercase().contains(&needle)
            })
            .map(|c| CoinSearchHit {
                id: c.id,
                name: c.name,
                symbol: c.symbol,
                market_cap_rank: c.market_cap_rank,
                thumb: c.image.clone(),
                large: c.image,
            })
            .collect())
    }

    async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        Ok(mock_global_data())
    }

    async fn simple_prices(&self, ids: &[String], currency: &str) -> Result<SimplePrices, CoreError> {
        Ok(mock_top_coins()
            .into_iter()
            .filter(|c| ids.contains(&c.id))
            .filter_map(|c| {
                let price = c.current_price?;
                Some((c.id, HashMap::from([(currency.to_string(), price)])))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_has_one_point_per_day() {
        let chart = mock_market_chart(ChartDays::Days(30));
        assert_eq!(chart.prices.len(), 30);
        assert_eq!(chart.market_caps.len(), 30);
        assert_eq!(mock_market_chart(ChartDays::Max).prices.len(), 365);
    }

    #[test]
    fn chart_steps_stay_within_bounds() {
        let chart = mock_market_chart(ChartDays::Days(90));
        for pair in chart.prices.windows(2) {
            let ratio = pair[1][1] / pair[0][1];
            assert!((0.975..=1.025).contains(&ratio), "step ratio {ratio}");
            assert!(pair[1][0] > pair[0][0]);
        }
    }

    #[tokio::test]
    async fn search_matches_name_or_symbol() {
        let mock = MockMarketProvider::new();
        let hits = mock.search("SOL").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "solana");
        assert!(mock.search("doge").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_coin_details_fall_back_to_bitcoin() {
        let details = MockMarketProvider::new().coin_details("nope").await.unwrap();
        assert_eq!(details["id"], "bitcoin");
    }
}
