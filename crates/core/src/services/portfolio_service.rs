use chrono::Utc;
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::portfolio::{Allocation, Portfolio, PortfolioWrite};
use crate::models::user::{User, WalletType};
use crate::providers::traits::BrokerageProvider;
use crate::storage::Datastore;

use super::market_service::MarketService;
use super::wallet_service::SolanaService;

/// Builds and stores the combined TradFi/DeFi view of a user.
pub struct PortfolioService {
    store: Arc<dyn Datastore>,
    solana: Arc<SolanaService>,
    market: Arc<MarketService>,
    brokerage: Arc<dyn BrokerageProvider>,
}

impl PortfolioService {
    pub fn new(
        store: Arc<dyn Datastore>,
        solana: Arc<SolanaService>,
        market: Arc<MarketService>,
        brokerage: Arc<dyn BrokerageProvider>,
    ) -> Self {
        Self {
            store,
            solana,
            market,
            brokerage,
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<Portfolio, CoreError> {
        self.store
            .get_portfolio(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Portfolio", user_id))
    }

    /// Write portfolio fields directly. Fields not supplied keep their
    /// stored values; the total follows the two sides unless given.
    pub async fn put(&self, user_id: &str, write: PortfolioWrite) -> Result<Portfolio, CoreError> {
        if write.alpaca_holdings.is_none()
            && write.defi_holdings.is_none()
            && write.tradfi_equity_usd.is_none()
            && write.defi_equity_usd.is_none()
            && write.total_equity_usd.is_none()
        {
            return Err(CoreError::ValidationError("Missing required fields".into()));
        }
        for (field, value) in [
            ("tradfiEquityUSD", write.tradfi_equity_usd),
            ("defiEquityUSD", write.defi_equity_usd),
            ("totalEquityUSD", write.total_equity_usd),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CoreError::ValidationError(format!(
                        "{field} must be a non-negative number, got {v}"
                    )));
                }
            }
        }

        let mut portfolio = self
            .store
            .get_portfolio(user_id)
            .await?
            .unwrap_or_else(|| Portfolio::empty(user_id));

        if let Some(h) = write.alpaca_holdings {
            portfolio.alpaca_holdings = h;
        }
        if let Some(h) = write.defi_holdings {
            portfolio.defi_holdings = h;
        }
        if let Some(v) = write.tradfi_equity_usd {
            portfolio.tradfi_equity_usd = v;
        }
        if let Some(v) = write.defi_equity_usd {
            portfolio.defi_equity_usd = v;
        }
        portfolio.total_equity_usd = write
            .total_equity_usd
            .unwrap_or(portfolio.tradfi_equity_usd + portfolio.defi_equity_usd);
        portfolio.last_updated = Utc::now();

        self.store.put_portfolio(portfolio.clone()).await?;
        Ok(portfolio)
    }

    /// Recompute a user's portfolio from scratch and store it.
    ///
    /// Brokerage holdings are included only when the profile has Alpaca
    /// linked. Every linked Solana wallet contributes its SOL and SPL token
    /// balances, valued at live USD prices (0 when no quote is available).
    pub async fn sync(&self, user_id: &str) -> Result<Portfolio, CoreError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;

        let mut portfolio = Portfolio::empty(user_id);

        if user.alpaca_linked {
            self.sync_brokerage(&mut portfolio).await.map_err(|e| {
                error!("Error syncing brokerage for {user_id}: {e}");
                e
            })?;
        }

        self.sync_wallets(&user, &mut portfolio).await.map_err(|e| {
            error!("Error syncing wallets for {user_id}: {e}");
            e
        })?;

        portfolio.total_equity_usd = portfolio.tradfi_equity_usd + portfolio.defi_equity_usd;
        portfolio.last_updated = Utc::now();

        self.store.put_portfolio(portfolio.clone()).await?;
        info!(
            "Synced portfolio for {user_id}: tradfi ${:.2}, defi ${:.2}",
            portfolio.tradfi_equity_usd, portfolio.defi_equity_usd
        );
        Ok(portfolio)
    }

    async fn sync_brokerage(&self, portfolio: &mut Portfolio) -> Result<(), CoreError> {
        let positions = self.brokerage.positions().await?;
        let account = self.brokerage.account().await?;

        for position in positions {
            *portfolio.alpaca_holdings.entry(position.symbol).or_insert(0.0) += position.qty;
        }
        portfolio.tradfi_equity_usd = account.portfolio_value;
        Ok(())
    }

    async fn sync_wallets(&self, user: &User, portfolio: &mut Portfolio) -> Result<(), CoreError> {
        let addresses: Vec<&str> = user.wallets_of(WalletType::Solana).collect();
        if addresses.is_empty() {
            return Ok(());
        }

        let mut holdings: HashMap<String, f64> = HashMap::new();
        for address in addresses {
            let sol = self.solana.get_sol_balance(address).await?;
            *holdings.entry("SOL".to_string()).or_insert(0.0) += sol;

            for token in self.solana.get_token_balances(address).await? {
                *holdings.entry(token.symbol).or_insert(0.0) += token.ui_amount;
            }
        }

        let symbols: Vec<String> = holdings.keys().cloned().collect();
        let prices = self.market.token_prices(&symbols).await;
        portfolio.defi_equity_usd = holdings
            .iter()
            .map(|(symbol, amount)| amount * prices.get(symbol).copied().unwrap_or(0.0))
            .sum();
        portfolio.defi_holdings = holdings;
        Ok(())
    }

    /// TradFi/DeFi split as whole percentages; `0/0` for an empty portfolio.
    pub fn calculate_allocation(portfolio: &Portfolio) -> Allocation {
        let total = portfolio.total_equity_usd;
        if !total.is_finite() || total <= 0.0 {
            return Allocation { tradfi: 0.0, defi: 0.0 };
        }
        Allocation {
            tradfi: (portfolio.tradfi_equity_usd / total * 100.0).round(),
            defi: (portfolio.defi_equity_usd / total * 100.0).round(),
        }
    }
}
