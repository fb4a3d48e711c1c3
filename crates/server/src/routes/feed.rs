use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use whale_watch_core::models::watchlist::{
    FeedFilter, FeedTransaction, WalletPatch, WatchWalletRequest, WatchedWallet,
};

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub running: bool,
    pub active_wallet: Option<WatchedWallet>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(list_wallets).post(add_wallet))
        .route("/watchlist/:address", patch(update_wallet).delete(remove_wallet))
        .route("/watchlist/:address/activate", post(activate_wallet))
        .route("/feed/status", get(status))
        .route("/feed/start", post(start))
        .route("/feed/stop", post(stop))
        .route("/feed/transactions", get(recent).delete(clear))
        .route("/feed/transactions.csv", get(export_csv))
}

// ── Watch list ──────────────────────────────────────────────────────

async fn list_wallets(State(state): State<AppState>) -> Json<Vec<WatchedWallet>> {
    Json(state.app.feed().list_wallets())
}

async fn add_wallet(
    State(state): State<AppState>,
    payload: Result<Json<WatchWalletRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WatchedWallet>)> {
    let Json(body) = payload?;
    let address = required(body.address)?;
    let wallet = state.app.feed().add_wallet(&address, body.nickname)?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

async fn update_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
    payload: Result<Json<WalletPatch>, JsonRejection>,
) -> ApiResult<Json<WatchedWallet>> {
    let Json(body) = payload?;
    Ok(Json(state.app.feed().update_wallet(&address, body)?))
}

async fn remove_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<StatusCode> {
    state.app.feed().remove_wallet(&address)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activate_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<FeedStatus>> {
    state.app.feed().set_active(Some(&address))?;
    Ok(status(State(state)).await)
}

// ── Transaction feed ────────────────────────────────────────────────

async fn status(State(state): State<AppState>) -> Json<FeedStatus> {
    let feed = state.app.feed();
    Json(FeedStatus {
        running: feed.is_running(),
        active_wallet: feed.active_wallet(),
    })
}

async fn start(State(state): State<AppState>) -> Json<FeedStatus> {
    state.app.feed().start();
    status(State(state)).await
}

async fn stop(State(state): State<AppState>) -> Json<FeedStatus> {
    state.app.feed().stop();
    status(State(state)).await
}

async fn recent(
    State(state): State<AppState>,
    filter: Result<Query<FeedFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedTransaction>>> {
    let Query(filter) = filter?;
    Ok(Json(state.app.feed().recent(&filter)))
}

async fn clear(State(state): State<AppState>) -> StatusCode {
    state.app.feed().clear();
    StatusCode::NO_CONTENT
}

async fn export_csv(
    State(state): State<AppState>,
    filter: Result<Query<FeedFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(filter) = filter?;
    let csv = state
        .app
        .feed()
        .export_csv(&filter)
        .map_err(|e| ApiError::with_context(e, "Failed to export transactions"))?;
    let disposition = format!(
        "attachment; filename=\"whale-watch-{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
