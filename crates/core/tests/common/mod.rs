// ═══════════════════════════════════════════════════════════════════
// Shared Test Helpers: mock RPC, scripted market providers, fixtures
// ═══════════════════════════════════════════════════════════════════
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use whale_watch_core::errors::CoreError;
use whale_watch_core::models::market::{
    ChartDays, Coin, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices,
};
use whale_watch_core::models::settings::Settings;
use whale_watch_core::providers::alpaca::MockBrokerageProvider;
use whale_watch_core::providers::registry::MarketProviderRegistry;
use whale_watch_core::providers::traits::MarketDataProvider;
use whale_watch_core::solana::{SolanaRpc, TokenAccount};
use whale_watch_core::storage::MemoryStore;
use whale_watch_core::WhaleWatch;

pub const BLOCKHASH: [u8; 32] = [7u8; 32];

// ═══════════════════════════════════════════════════════════════════
// Solana RPC
// ═══════════════════════════════════════════════════════════════════

/// In-memory stand-in for a Solana JSON-RPC node.
#[derive(Default)]
pub struct MockRpc {
    pub balances: Mutex<HashMap<String, u64>>,
    pub tokens: Mutex<HashMap<String, Vec<TokenAccount>>>,
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail: bool,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_balance(self, address: &str, lamports: u64) -> Self {
        self.balances.lock().unwrap().insert(address.to_string(), lamports);
        self
    }

    pub fn with_tokens(self, owner: &str, accounts: Vec<TokenAccount>) -> Self {
        self.tokens.lock().unwrap().insert(owner.to_string(), accounts);
        self
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.fail {
            Err(CoreError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_balance(&self, address: &str) -> Result<u64, CoreError> {
        self.check()?;
        Ok(self.balances.lock().unwrap().get(address).copied().unwrap_or(0))
    }

    async fn get_token_accounts(
        &self,
        owner: &str,
        _program_id: &str,
    ) -> Result<Vec<TokenAccount>, CoreError> {
        self.check()?;
        Ok(self.tokens.lock().unwrap().get(owner).cloned().unwrap_or_default())
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], CoreError> {
        self.check()?;
        Ok(BLOCKHASH)
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, CoreError> {
        self.check()?;
        self.sent.lock().unwrap().push(wire.to_vec());
        Ok(bs58::encode(&wire[1..65]).into_string())
    }
}

pub fn token_account(mint: &str, amount: u64, decimals: u8) -> TokenAccount {
    TokenAccount {
        mint: mint.to_string(),
        amount,
        decimals,
        ui_amount: amount as f64 / 10f64.powi(decimals as i32),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Market providers
// ═══════════════════════════════════════════════════════════════════

/// Market provider that fails according to a script, then serves fixed
/// "live" data. `calls` counts every request it receives.
pub struct ScriptedMarket {
    name: String,
    script: Mutex<VecDeque<fn() -> CoreError>>,
    always: Option<fn() -> CoreError>,
    pub calls: Arc<AtomicUsize>,
    prices: HashMap<String, f64>,
    empty: bool,
}

impl ScriptedMarket {
    pub fn ok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            always: None,
            calls: Arc::new(AtomicUsize::new(0)),
            prices: HashMap::new(),
            empty: false,
        }
    }

    pub fn failing(name: &str, err: fn() -> CoreError) -> Self {
        Self {
            always: Some(err),
            ..Self::ok(name)
        }
    }

    pub fn fail_then_ok(name: &str, errors: Vec<fn() -> CoreError>) -> Self {
        Self {
            script: Mutex::new(errors.into()),
            ..Self::ok(name)
        }
    }

    /// Succeeds but with empty payloads.
    pub fn empty(name: &str) -> Self {
        Self {
            empty: true,
            ..Self::ok(name)
        }
    }

    pub fn with_price(mut self, coin_id: &str, usd: f64) -> Self {
        self.prices.insert(coin_id.to_string(), usd);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn next(&self) -> Result<(), CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.always {
            return Err(err());
        }
        match self.script.lock().unwrap().pop_front() {
            Some(err) => Err(err()),
            None => Ok(()),
        }
    }
}

pub fn live_coin(id: &str) -> Coin {
    serde_json::from_value(json!({
        "id": id,
        "symbol": "live",
        "name": format!("Live {id}"),
        "current_price": 1.0,
        "market_cap_rank": 1
    }))
    .unwrap()
}

#[async_trait]
impl MarketDataProvider for ScriptedMarket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn top_coins(&self, count: usize, _currency: &str) -> Result<Vec<Coin>, CoreError> {
        self.next()?;
        if self.empty {
            return Ok(vec![]);
        }
        Ok((0..count.min(2)).map(|i| live_coin(&format!("live-{i}"))).collect())
    }

    async fn market_chart(
        &self,
        _coin_id: &str,
        _days: ChartDays,
        _currency: &str,
    ) -> Result<MarketChart, CoreError> {
        self.next()?;
        if self.empty {
            return Ok(MarketChart::default());
        }
        Ok(MarketChart {
            prices: vec![[1.0, 10.0], [2.0, 11.0]],
            market_caps: vec![],
            total_volumes: vec![],
        })
    }

    async fn coin_details(&self, coin_id: &str) -> Result<Value, CoreError> {
        self.next()?;
        if self.empty {
            return Ok(json!({}));
        }
        Ok(json!({ "id": coin_id, "source": self.name }))
    }

    async fn search(&self, query: &str) -> Result<Vec<CoinSearchHit>, CoreError> {
        self.next()?;
        Ok(vec![CoinSearchHit {
            id: format!("{query}-live"),
            name: query.to_string(),
            symbol: query.to_string(),
            market_cap_rank: None,
            thumb: None,
            large: None,
        }])
    }

    async fn global(&self) -> Result<GlobalMarketData, CoreError> {
        self.next()?;
        Ok(GlobalMarketData {
            active_cryptocurrencies: Some(1),
            ..GlobalMarketData::default()
        })
    }

    async fn simple_prices(&self, ids: &[String], currency: &str) -> Result<SimplePrices, CoreError> {
        self.next()?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let price = self.prices.get(id)?;
                Some((id.clone(), HashMap::from([(currency.to_string(), *price)])))
            })
            .collect())
    }
}

pub fn rate_limited() -> CoreError {
    CoreError::RateLimited("test".into())
}

pub fn network_down() -> CoreError {
    CoreError::Network("connection refused".into())
}

pub fn server_error() -> CoreError {
    CoreError::Api {
        provider: "test".into(),
        message: "HTTP 500".into(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

/// Settings with retries that never actually sleep.
pub fn fast_settings() -> Settings {
    Settings {
        retry_delay_ms: 0,
        feed_interval_ms: 10,
        ..Settings::default()
    }
}

/// Registry whose every live source is down.
pub fn offline_registry() -> MarketProviderRegistry {
    let mut registry = MarketProviderRegistry::new();
    registry.register(Box::new(ScriptedMarket::failing("primary", network_down)));
    registry.register_fallback(Box::new(ScriptedMarket::failing("proxy", network_down)));
    registry
}

/// Facade over an in-memory store, the given RPC and registry, and the
/// mock brokerage.
pub fn app(rpc: MockRpc, registry: MarketProviderRegistry) -> WhaleWatch {
    WhaleWatch::from_parts(
        fast_settings(),
        Arc::new(MemoryStore::new()),
        Arc::new(rpc),
        registry,
        Arc::new(MockBrokerageProvider::new()),
    )
}
