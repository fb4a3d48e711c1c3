use std::collections::HashMap;

use crate::models::settings::Settings;

use super::alpaca::{AlpacaProvider, MockBrokerageProvider};
use super::coingecko::CoinGeckoProvider;
use super::traits::{BrokerageProvider, MarketDataProvider};

/// Ordered market data sources, split into two tiers.
///
/// Direct providers are retried and rotated through on network errors.
/// Fallback providers (proxies) get a single attempt each once the direct
/// tier is exhausted.
pub struct MarketProviderRegistry {
    direct: Vec<Box<dyn MarketDataProvider>>,
    fallback: Vec<Box<dyn MarketDataProvider>>,
}

impl MarketProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            direct: Vec::new(),
            fallback: Vec::new(),
        }
    }

    /// Create a registry with CoinGecko endpoints configured from settings.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(CoinGeckoProvider::new(settings.coingecko_base_url.clone())));
        for url in &settings.coingecko_alternate_urls {
            registry.register(Box::new(CoinGeckoProvider::new(url.clone())));
        }

        if let Some(prefix) = &settings.coingecko_proxy_url {
            registry.register_fallback(Box::new(CoinGeckoProvider::proxied(
                prefix.clone(),
                settings.coingecko_base_url.clone(),
            )));
        }

        registry
    }

    /// Register a provider in the retried direct tier.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.direct.push(provider);
    }

    /// Register a single-attempt fallback provider.
    pub fn register_fallback(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.fallback.push(provider);
    }

    pub fn direct_providers(&self) -> Vec<&dyn MarketDataProvider> {
        self.direct.iter().map(|p| p.as_ref()).collect()
    }

    pub fn fallback_providers(&self) -> Vec<&dyn MarketDataProvider> {
        self.fallback.iter().map(|p| p.as_ref()).collect()
    }
}

impl Default for MarketProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the brokerage backend: live Alpaca when both `alpaca_key` and
/// `alpaca_secret` are present, otherwise the fixed mock account.
pub fn brokerage_from_keys(api_keys: &HashMap<String, String>) -> Box<dyn BrokerageProvider> {
    match (api_keys.get("alpaca_key"), api_keys.get("alpaca_secret")) {
        (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
            Box::new(AlpacaProvider::new(key.clone(), secret.clone()))
        }
        _ => Box::new(MockBrokerageProvider::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_settings() {
        let settings = Settings::default();
        let registry = MarketProviderRegistry::new_with_defaults(&settings);
        assert_eq!(registry.direct_providers().len(), 2);
        assert_eq!(registry.fallback_providers().len(), 1);

        let no_proxy = Settings {
            coingecko_proxy_url: None,
            coingecko_alternate_urls: vec![],
            ..Settings::default()
        };
        let registry = MarketProviderRegistry::new_with_defaults(&no_proxy);
        assert_eq!(registry.direct_providers().len(), 1);
        assert!(registry.fallback_providers().is_empty());
    }

    #[test]
    fn brokerage_needs_both_keys() {
        let mut keys = HashMap::new();
        assert_eq!(brokerage_from_keys(&keys).name(), "Mock brokerage");
        keys.insert("alpaca_key".to_string(), "k".to_string());
        assert_eq!(brokerage_from_keys(&keys).name(), "Mock brokerage");
        keys.insert("alpaca_secret".to_string(), "s".to_string());
        assert_eq!(brokerage_from_keys(&keys).name(), "Alpaca");
    }
}
