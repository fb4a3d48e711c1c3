use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use whale_watch_core::models::transaction::{NewTransaction, Transaction, TransactionUpdate};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    // GET takes a user id, PATCH a transaction id; the router needs one
    // parameter name per position.
    Router::new()
        .route("/transactions", post(create_transaction))
        .route(
            "/transactions/:id",
            get(list_for_user).patch(update_transaction),
        )
        .route("/transactions/record/:id", get(get_transaction))
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.app.transactions().list_for_user(&user_id).await?))
}

async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(body) = payload?;
    let transaction = state.app.transactions().create(body).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let Json(body) = payload?;
    Ok(Json(state.app.transactions().update_status(&id, body).await?))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(state.app.transactions().get(&id).await?))
}
