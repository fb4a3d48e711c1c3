pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod solana;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use models::settings::Settings;
use providers::registry::{brokerage_from_keys, MarketProviderRegistry};
use providers::traits::BrokerageProvider;
use services::{
    feed_service::FeedService,
    market_service::{MarketService, RetryPolicy},
    portfolio_service::PortfolioService,
    transaction_service::TransactionService,
    user_service::UserService,
    wallet_service::SolanaService,
};
use solana::{HttpSolanaRpc, SolanaRpc};
use storage::{Datastore, MemoryStore};

/// Main entry point for the Whale Watch core library.
/// Wires the datastore, the Solana RPC, market and brokerage providers
/// into the services the HTTP layer calls.
#[must_use]
pub struct WhaleWatch {
    settings: Settings,
    store: Arc<dyn Datastore>,
    solana: Arc<SolanaService>,
    market: Arc<MarketService>,
    users: UserService,
    transactions: TransactionService,
    portfolios: PortfolioService,
    feed: FeedService,
}

impl std::fmt::Debug for WhaleWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhaleWatch")
            .field("solana_rpc_url", &self.settings.solana_rpc_url)
            .field("market_providers", &self.market.provider_names())
            .field("feed_running", &self.feed.is_running())
            .finish()
    }
}

impl WhaleWatch {
    /// Volatile in-memory store, live RPC and market endpoints from `settings`.
    pub fn new(settings: Settings) -> Self {
        Self::with_store(settings, Arc::new(MemoryStore::new()))
    }

    /// Live RPC and market endpoints over a caller-supplied store.
    pub fn with_store(settings: Settings, store: Arc<dyn Datastore>) -> Self {
        let rpc: Arc<dyn SolanaRpc> = Arc::new(HttpSolanaRpc::new(settings.solana_rpc_url.clone()));
        let registry = MarketProviderRegistry::new_with_defaults(&settings);
        let brokerage: Arc<dyn BrokerageProvider> = Arc::from(brokerage_from_keys(&settings.api_keys));
        Self::from_parts(settings, store, rpc, registry, brokerage)
    }

    /// Fully injected construction, used by tests and custom deployments.
    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn Datastore>,
        rpc: Arc<dyn SolanaRpc>,
        registry: MarketProviderRegistry,
        brokerage: Arc<dyn BrokerageProvider>,
    ) -> Self {
        let solana = Arc::new(SolanaService::new(rpc));
        let market = Arc::new(MarketService::new(registry, RetryPolicy::from_settings(&settings)));

        Self {
            users: UserService::new(Arc::clone(&store)),
            transactions: TransactionService::new(Arc::clone(&store), settings.transaction_limit),
            portfolios: PortfolioService::new(
                Arc::clone(&store),
                Arc::clone(&solana),
                Arc::clone(&market),
                brokerage,
            ),
            feed: FeedService::new(Duration::from_millis(settings.feed_interval_ms.max(1))),
            settings,
            store,
            solana,
            market,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    pub fn solana(&self) -> &SolanaService {
        &self.solana
    }

    pub fn market(&self) -> &MarketService {
        &self.market
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn portfolios(&self) -> &PortfolioService {
        &self.portfolios
    }

    pub fn feed(&self) -> &FeedService {
        &self.feed
    }
}
