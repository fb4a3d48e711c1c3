//! Market data routes. These never fail upstream: when every live source
//! is down the service answers with mock data.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use whale_watch_core::models::market::{
    ChartDays, Coin, CoinDetails, CoinSearchHit, GlobalMarketData, MarketChart, SimplePrices,
};

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_TOP_COUNT: usize = 20;
const MAX_TOP_COUNT: usize = 250;
const DEFAULT_CURRENCY: &str = "usd";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TopQuery {
    pub count: Option<usize>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChartQuery {
    pub days: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PricesQuery {
    /// Comma separated CoinGecko ids.
    pub ids: Option<String>,
    pub currency: Option<String>,
}

fn currency(value: Option<String>) -> String {
    value
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/market/top", get(top_coins))
        .route("/market/chart/:coin_id", get(market_chart))
        .route("/market/coins/:coin_id", get(coin_details))
        .route("/market/search", get(search))
        .route("/market/global", get(global))
        .route("/market/prices", get(simple_prices))
}

async fn top_coins(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Coin>>> {
    let Query(q) = query?;
    let count = q.count.unwrap_or(DEFAULT_TOP_COUNT).clamp(1, MAX_TOP_COUNT);
    Ok(Json(state.app.market().get_top_coins(count, &currency(q.currency)).await))
}

async fn market_chart(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> ApiResult<Json<MarketChart>> {
    let Query(q) = query?;
    let days = match q.days {
        Some(d) => d.parse::<ChartDays>().map_err(ApiError::bad_request)?,
        None => ChartDays::default(),
    };
    let chart = state
        .app
        .market()
        .get_market_chart(&coin_id, days, &currency(q.currency))
        .await;
    Ok(Json(chart))
}

async fn coin_details(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Json<CoinDetails> {
    Json(state.app.market().get_coin_details(&coin_id).await)
}

async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CoinSearchHit>>> {
    let Query(q) = query?;
    let term = required(q.query)?;
    Ok(Json(state.app.market().search_coins(term.trim()).await))
}

async fn global(State(state): State<AppState>) -> Json<GlobalMarketData> {
    Json(state.app.market().get_global_data().await)
}

async fn simple_prices(
    State(state): State<AppState>,
    query: Result<Query<PricesQuery>, QueryRejection>,
) -> ApiResult<Json<SimplePrices>> {
    let Query(q) = query?;
    let ids: Vec<String> = required(q.ids)?
        .split(',')
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(ApiError::missing_fields());
    }
    Ok(Json(
        state.app.market().get_simple_prices(&ids, &currency(q.currency)).await,
    ))
}
