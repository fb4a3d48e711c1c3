use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::errors::CoreError;
use crate::models::watchlist::{
    FeedFilter, FeedTransaction, FeedTxType, WalletBalance, WalletPatch, WatchedWallet,
};
use crate::solana::address::validate_address;

/// Number of feed entries retained, newest first.
pub const FEED_CAPACITY: usize = 100;

const FEED_TOKENS: [(&str, &str); 5] = [
    ("SOL", "Solana"),
    ("BONK", "Bonk"),
    ("JTO", "Jito"),
    ("RAY", "Raydium"),
    ("PYTH", "Pyth Network"),
];

const CSV_HEADERS: [&str; 8] = [
    "Timestamp (UTC)",
    "Transaction ID (TXID)",
    "Wallet",
    "Type",
    "Token",
    "Amount",
    "USD Value",
    "Solscan Link",
];

#[derive(Default)]
struct FeedState {
    wallets: Vec<WatchedWallet>,
    recent: VecDeque<FeedTransaction>,
}

impl FeedState {
    fn push(&mut self, tx: FeedTransaction) {
        self.recent.push_front(tx);
        self.recent.truncate(FEED_CAPACITY);
    }

    fn wallet_mut(&mut self, address: &str) -> Result<&mut WatchedWallet, CoreError> {
        self.wallets
            .iter_mut()
            .find(|w| w.address == address)
            .ok_or_else(|| CoreError::not_found("Wallet", address))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn random_tag(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Produce one synthetic transaction against a random watched wallet and
/// refresh that wallet's balance and last activity.
fn generate(state: &mut FeedState) -> FeedTransaction {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    let wallet_address = if state.wallets.is_empty() {
        format!("Wallet{}", rng.gen_range(0..1000))
    } else {
        let idx = rng.gen_range(0..state.wallets.len());
        let wallet = &mut state.wallets[idx];
        wallet.last_activity = Some(now);
        wallet.balance = Some(WalletBalance {
            sol: round_to(rng.gen::<f64>() * 1000.0, 2),
            usd: round_to(rng.gen::<f64>() * 50_000.0, 2),
        });
        wallet.address.clone()
    };

    let tx_type = FeedTxType::ALL[rng.gen_range(0..FeedTxType::ALL.len())];
    let (symbol, name) = FEED_TOKENS[rng.gen_range(0..FEED_TOKENS.len())];
    let amount = round_to(rng.gen::<f64>() * 100.0, 3);
    let usd_value = round_to(amount * rng.gen::<f64>() * 100.0, 2);

    FeedTransaction {
        id: format!("tx-{}-{}", now.timestamp_millis(), random_tag(9)),
        wallet_address,
        tx_type,
        token_symbol: symbol.to_string(),
        token_name: Some(name.to_string()),
        amount,
        usd_value: Some(usd_value),
        timestamp: now,
        solscan_link: Some(format!("https://solscan.io/tx/{}", random_tag(32))),
    }
}

/// Watch list plus a synthetic transaction stream.
///
/// The stream is a tokio interval task; `start` and `stop` are idempotent
/// and dropping the service cancels the task.
pub struct FeedService {
    state: Arc<Mutex<FeedState>>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FeedService {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState::default())),
            interval,
            task: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Watch list ──────────────────────────────────────────────────

    pub fn list_wallets(&self) -> Vec<WatchedWallet> {
        self.lock().wallets.clone()
    }

    /// Add a wallet. Re-adding a watched address returns the existing entry.
    pub fn add_wallet(&self, address: &str, nickname: Option<String>) -> Result<WatchedWallet, CoreError> {
        let address = address.trim();
        validate_address(address)?;

        let mut state = self.lock();
        if let Some(existing) = state.wallets.iter().find(|w| w.address == address) {
            return Ok(existing.clone());
        }
        let wallet = WatchedWallet::new(address, nickname.filter(|n| !n.trim().is_empty()));
        state.wallets.push(wallet.clone());
        Ok(wallet)
    }

    pub fn remove_wallet(&self, address: &str) -> Result<(), CoreError> {
        let mut state = self.lock();
        let before = state.wallets.len();
        state.wallets.retain(|w| w.address != address);
        if state.wallets.len() == before {
            return Err(CoreError::not_found("Wallet", address));
        }
        Ok(())
    }

    pub fn update_wallet(&self, address: &str, patch: WalletPatch) -> Result<WatchedWallet, CoreError> {
        let mut state = self.lock();
        let wallet = state.wallet_mut(address)?;
        if let Some(nickname) = patch.nickname {
            wallet.nickname = Some(nickname).filter(|n| !n.trim().is_empty());
        }
        if let Some(balance) = patch.balance {
            wallet.balance = Some(balance);
        }
        if let Some(at) = patch.last_activity {
            wallet.last_activity = Some(at);
        }
        Ok(wallet.clone())
    }

    /// Mark one wallet active (clearing the others), or none with `None`.
    pub fn set_active(&self, address: Option<&str>) -> Result<(), CoreError> {
        let mut state = self.lock();
        if let Some(addr) = address {
            state.wallet_mut(addr)?;
        }
        for wallet in &mut state.wallets {
            wallet.is_active = Some(wallet.address.as_str()) == address;
        }
        Ok(())
    }

    pub fn active_wallet(&self) -> Option<WatchedWallet> {
        self.lock().wallets.iter().find(|w| w.is_active).cloned()
    }

    // ── Transaction stream ──────────────────────────────────────────

    /// Start the stream. Returns `false` if it was already running.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let state = Arc::clone(&self.state);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
                let tx = generate(&mut guard);
                debug!("Feed: {} {} {} on {}", tx.tx_type, tx.amount, tx.token_symbol, tx.wallet_address);
                guard.push(tx);
            }
        }));
        info!("Transaction feed started ({}ms interval)", period.as_millis());
        true
    }

    /// Stop the stream. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        match handle {
            Some(h) => {
                h.abort();
                info!("Transaction feed stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Generate and record a single transaction immediately.
    pub fn generate_now(&self) -> FeedTransaction {
        let tx = generate(&mut self.lock());
        self.record(tx.clone());
        tx
    }

    /// Add a transaction to the retained window, evicting the oldest past
    /// [`FEED_CAPACITY`].
    pub fn record(&self, tx: FeedTransaction) {
        self.lock().push(tx);
    }

    /// Retained transactions matching `filter`, newest first.
    pub fn recent(&self, filter: &FeedFilter) -> Vec<FeedTransaction> {
        self.lock().recent.iter().filter(|tx| filter.matches(tx)).cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().recent.clear();
    }

    /// Matching transactions as CSV, one header row then newest first.
    pub fn export_csv(&self, filter: &FeedFilter) -> Result<String, CoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;
        for tx in self.recent(filter) {
            writer.write_record([
                tx.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                tx.id,
                tx.wallet_address,
                tx.tx_type.to_string(),
                tx.token_symbol,
                tx.amount.to_string(),
                tx.usd_value.map(|v| format!("{v:.2}")).unwrap_or_default(),
                tx.solscan_link.unwrap_or_default(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Serialization(format!("CSV: {e}")))?;
        String::from_utf8(bytes).map_err(|e| CoreError::Serialization(format!("CSV: {e}")))
    }
}

impl Drop for FeedService {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().ok().and_then(Option::take) {
            handle.abort();
        }
    }
}
