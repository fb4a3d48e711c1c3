use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use whale_watch_core::models::portfolio::{Allocation, Portfolio, PortfolioWrite};
use whale_watch_core::services::portfolio_service::PortfolioService;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/portfolios/:id", get(get_portfolio).post(write_portfolio))
        .route("/portfolios/:id/sync", post(sync_portfolio))
        .route("/portfolios/:id/allocation", get(get_allocation))
}

async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Portfolio>> {
    Ok(Json(state.app.portfolios().get(&id).await?))
}

async fn write_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PortfolioWrite>, JsonRejection>,
) -> ApiResult<Json<Portfolio>> {
    let Json(body) = payload?;
    Ok(Json(state.app.portfolios().put(&id, body).await?))
}

/// Recompute holdings from the brokerage and every linked Solana wallet.
async fn sync_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Portfolio>> {
    state
        .app
        .portfolios()
        .sync(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::with_context(e, "Failed to sync portfolio"))
}

async fn get_allocation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Allocation>> {
    let portfolio = state.app.portfolios().get(&id).await?;
    Ok(Json(PortfolioService::calculate_allocation(&portfolio)))
}
