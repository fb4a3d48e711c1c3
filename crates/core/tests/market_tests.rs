// ═══════════════════════════════════════════════════════════════════
// Market Tests: retry, endpoint rotation, proxy and mock fallback
// ═══════════════════════════════════════════════════════════════════

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{network_down, rate_limited, server_error, ScriptedMarket};
use whale_watch_core::models::market::ChartDays;
use whale_watch_core::providers::mock_market::mock_top_coins;
use whale_watch_core::providers::registry::MarketProviderRegistry;
use whale_watch_core::services::market_service::{MarketService, RetryPolicy};

fn no_wait(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::ZERO,
    }
}

fn is_live(ids: &[String]) -> bool {
    ids.iter().all(|id| id.starts_with("live-"))
}

// ═══════════════════════════════════════════════════════════════════
// Direct tier
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn rate_limit_retries_same_endpoint() {
    let primary = ScriptedMarket::fail_then_ok("primary", vec![rate_limited, rate_limited]);
    let primary_calls = primary.counter();
    let alternate = ScriptedMarket::ok("alternate");
    let alternate_calls = alternate.counter();

    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(primary));
    registry.register(Box::new(alternate));
    let market = MarketService::new(registry, no_wait(3));

    let coins = market.get_top_coins(2, "usd").await;
    let ids: Vec<String> = coins.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["live-0", "live-1"]);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 3);
    assert_eq!(alternate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn network_error_rotates_to_alternate_endpoint() {
    let primary = ScriptedMarket::failing("primary", network_down);
    let primary_calls = primary.counter();
    let alternate = ScriptedMarket::ok("alternate");
    let alternate_calls = alternate.counter();

    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(primary));
    registry.register(Box::new(alternate));
    let market = MarketService::new(registry, no_wait(3));

    let chart = market.get_market_chart("bitcoin", ChartDays::Days(7), "usd").await;
    assert_eq!(chart.prices, vec![[1.0, 10.0], [2.0, 11.0]]);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(alternate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn attempts_are_bounded_by_max_retries() {
    let primary = ScriptedMarket::failing("primary", rate_limited);
    let calls = primary.counter();

    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(primary));
    let market = MarketService::new(registry, no_wait(3));

    market.get_global_data().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn server_error_ends_direct_tier_immediately() {
    let primary = ScriptedMarket::failing("primary", server_error);
    let primary_calls = primary.counter();
    let alternate = ScriptedMarket::ok("alternate");
    let alternate_calls = alternate.counter();
    let proxy = ScriptedMarket::ok("proxy");
    let proxy_calls = proxy.counter();

    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(primary));
    registry.register(Box::new(alternate));
    registry.register_fallback(Box::new(proxy));
    let market = MarketService::new(registry, no_wait(3));

    let details = market.get_coin_details("solana").await;
    assert_eq!(details["source"], "proxy");
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(alternate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(proxy_calls.load(Ordering::SeqCst), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Fallback tiers
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn proxy_is_tried_once_after_direct_tier_fails() {
    let failing_proxy = ScriptedMarket::failing("proxy-a", network_down);
    let failing_calls = failing_proxy.counter();
    let good_proxy = ScriptedMarket::ok("proxy-b");

    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(ScriptedMarket::failing("primary", network_down)));
    registry.register_fallback(Box::new(failing_proxy));
    registry.register_fallback(Box::new(good_proxy));
    let market = MarketService::new(registry, no_wait(2));

    let coins = market.get_top_coins(1, "usd").await;
    let ids: Vec<String> = coins.into_iter().map(|c| c.id).collect();
    assert!(is_live(&ids));
    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_live_response_falls_through() {
    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(ScriptedMarket::empty("primary")));
    registry.register_fallback(Box::new(ScriptedMarket::ok("proxy")));
    let market = MarketService::new(registry, no_wait(3));

    let coins = market.get_top_coins(2, "usd").await;
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[0].id, "live-0");
}

#[tokio::test]
async fn all_sources_down_serves_mock_top_coins() {
    let market = MarketService::new(common::offline_registry(), no_wait(3));

    let coins = market.get_top_coins(10, "usd").await;
    let ids: Vec<&str> = coins.iter().map(|c| c.id.as_str()).collect();
    let expected: Vec<String> = mock_top_coins().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(coins[0].id, "bitcoin");
    assert_eq!(coins[0].current_price, Some(55225.0));

    let two = market.get_top_coins(2, "usd").await;
    assert_eq!(two.len(), 2);
    assert_eq!(two[1].id, "ethereum");
}

#[tokio::test]
async fn all_sources_down_serves_mock_chart_and_global() {
    let market = MarketService::new(common::offline_registry(), no_wait(1));

    let chart = market.get_market_chart("bitcoin", ChartDays::Days(30), "usd").await;
    assert_eq!(chart.prices.len(), 30);

    let global = market.get_global_data().await;
    assert!(global.active_cryptocurrencies.unwrap_or(0) > 1);

    let hits = market.search_coins("sol").await;
    assert!(hits.iter().any(|h| h.id == "solana"));
}

#[tokio::test]
async fn empty_registry_still_answers_from_mock() {
    let market = MarketService::new(MarketProviderRegistry::new(), no_wait(3));
    assert!(market.provider_names().is_empty());
    let details = market.get_coin_details("ethereum").await;
    assert_eq!(details["id"], "ethereum");
}

#[test]
fn provider_names_list_direct_then_fallback() {
    let mut registry = MarketProviderRegistry::new();
    registry.register_fallback(Box::new(ScriptedMarket::ok("proxy")));
    registry.register(Box::new(ScriptedMarket::ok("primary")));
    registry.register(Box::new(ScriptedMarket::ok("alternate")));
    let market = MarketService::new(registry, no_wait(1));
    assert_eq!(market.provider_names(), vec!["primary", "alternate", "proxy"]);
}

// ═══════════════════════════════════════════════════════════════════
// Token pricing
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn token_prices_use_live_quotes() {
    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(
        ScriptedMarket::ok("primary")
            .with_price("solana", 150.0)
            .with_price("usd-coin", 1.0),
    ));
    let market = MarketService::new(registry, no_wait(1));

    let symbols = vec!["SOL".to_string(), "USDC".to_string(), "BONK".to_string()];
    let prices = market.token_prices(&symbols).await;
    assert_eq!(prices["SOL"], 150.0);
    assert_eq!(prices["USDC"], 1.0);
    assert_eq!(prices["BONK"], 0.0);
}

#[tokio::test]
async fn token_prices_are_zero_when_offline() {
    let market = MarketService::new(common::offline_registry(), no_wait(2));
    let prices = market.token_prices(&["SOL".to_string(), "USDT".to_string()]).await;
    assert_eq!(prices.len(), 2);
    assert!(prices.values().all(|p| *p == 0.0));
}

#[test]
fn retry_policy_from_settings_never_drops_below_one_attempt() {
    let settings = whale_watch_core::models::settings::Settings {
        max_retries: 0,
        retry_delay_ms: 250,
        ..Default::default()
    };
    let policy = RetryPolicy::from_settings(&settings);
    assert_eq!(policy.max_retries, 1);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
}
