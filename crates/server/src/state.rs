use chrono::{DateTime, Utc};
use std::sync::Arc;
use whale_watch_core::WhaleWatch;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<WhaleWatch>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(app: WhaleWatch) -> Self {
        Self {
            app: Arc::new(app),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
