use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

pub mod feed;
pub mod health;
pub mod market;
pub mod portfolios;
pub mod solana;
pub mod transactions;
pub mod users;

/// Every route under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(solana::routes())
        .merge(users::routes())
        .merge(portfolios::routes())
        .merge(transactions::routes())
        .merge(market::routes())
        .merge(feed::routes())
}

/// A body field that must be present and non-blank.
pub(crate) fn required(value: Option<String>) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)
}
