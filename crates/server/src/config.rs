use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use whale_watch_core::models::settings::Settings;

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} is set but WHALE_WATCH_DATA_PASSWORD is missing")]
    MissingPassword(String),
}

/// Process configuration, read from the environment (and `.env`).
///
/// | Variable                      | Default                              |
/// |-------------------------------|--------------------------------------|
/// | `HOST`                        | `0.0.0.0`                            |
/// | `PORT`                        | `3001`                               |
/// | `WHALE_WATCH_DATA_FILE`       | unset: in-memory only                |
/// | `WHALE_WATCH_DATA_PASSWORD`   | required with a data file            |
/// | `SOLANA_RPC_URL`              | devnet                               |
/// | `COINGECKO_BASE_URL`          | public CoinGecko v3                  |
/// | `COINGECKO_ALTERNATE_URLS`    | comma separated                      |
/// | `COINGECKO_PROXY_URL`         | corsproxy.io, empty disables         |
/// | `MARKET_MAX_RETRIES`          | `3`                                  |
/// | `MARKET_RETRY_DELAY_MS`       | `1000`                               |
/// | `TRANSACTION_LIST_LIMIT`      | `10`                                 |
/// | `FEED_INTERVAL_MS`            | `3000`                               |
/// | `ALPACA_API_KEY` / `ALPACA_SECRET_KEY` | unset: mock brokerage       |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_file: Option<PathBuf>,
    pub data_password: Option<String>,
    pub settings: Settings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_file: None,
            data_password: None,
            settings: Settings::default(),
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = var("HOST") {
            config.host = parse("HOST", v)?;
        }
        if let Some(v) = var("PORT") {
            config.port = parse("PORT", v)?;
        }
        config.data_file = var("WHALE_WATCH_DATA_FILE").map(PathBuf::from);
        config.data_password = var("WHALE_WATCH_DATA_PASSWORD");
        if let (Some(path), None) = (&config.data_file, &config.data_password) {
            return Err(ConfigError::MissingPassword(path.display().to_string()));
        }

        let settings = &mut config.settings;
        if let Some(v) = var("SOLANA_RPC_URL") {
            settings.solana_rpc_url = v;
        }
        if let Some(v) = var("COINGECKO_BASE_URL") {
            settings.coingecko_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("COINGECKO_ALTERNATE_URLS") {
            settings.coingecko_alternate_urls = v
                .split(',')
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        // Present but blank turns the proxy tier off.
        if let Some(v) = lookup("COINGECKO_PROXY_URL") {
            settings.coingecko_proxy_url = Some(v.trim().to_string()).filter(|v| !v.is_empty());
        }
        if let Some(v) = var("MARKET_MAX_RETRIES") {
            settings.max_retries = parse("MARKET_MAX_RETRIES", v)?;
        }
        if let Some(v) = var("MARKET_RETRY_DELAY_MS") {
            settings.retry_delay_ms = parse("MARKET_RETRY_DELAY_MS", v)?;
        }
        if let Some(v) = var("TRANSACTION_LIST_LIMIT") {
            settings.transaction_limit = parse("TRANSACTION_LIST_LIMIT", v)?;
        }
        if let Some(v) = var("FEED_INTERVAL_MS") {
            settings.feed_interval_ms = parse("FEED_INTERVAL_MS", v)?;
        }
        if let Some(v) = var("ALPACA_API_KEY") {
            settings.api_keys.insert("alpaca_key".into(), v);
        }
        if let Some(v) = var("ALPACA_SECRET_KEY") {
            settings.api_keys.insert("alpaca_secret".into(), v);
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = from(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert!(config.data_file.is_none());
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = from(&[
            ("PORT", "8080"),
            ("SOLANA_RPC_URL", "http://localhost:8899"),
            ("COINGECKO_ALTERNATE_URLS", "https://a.example/, ,https://b.example"),
            ("COINGECKO_PROXY_URL", ""),
            ("MARKET_MAX_RETRIES", "5"),
            ("ALPACA_API_KEY", "k"),
            ("ALPACA_SECRET_KEY", "s"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.settings.solana_rpc_url, "http://localhost:8899");
        assert_eq!(
            config.settings.coingecko_alternate_urls,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.settings.coingecko_proxy_url.is_none());
        assert_eq!(config.settings.max_retries, 5);
        assert_eq!(config.settings.api_keys["alpaca_key"], "k");
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "PORT",
                value: "eighty".into()
            }
        );
    }

    #[test]
    fn data_file_needs_password() {
        assert!(matches!(
            from(&[("WHALE_WATCH_DATA_FILE", "/tmp/w.wwdb")]),
            Err(ConfigError::MissingPassword(_))
        ));
        let config = from(&[
            ("WHALE_WATCH_DATA_FILE", "/tmp/w.wwdb"),
            ("WHALE_WATCH_DATA_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/w.wwdb")));
    }
}
