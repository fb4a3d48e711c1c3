//! Wallet routes: keypair generation, balances, transfers and
//! message signatures.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use whale_watch_core::models::wallet::{GeneratedWallet, TokenBalance};

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferRequest {
    pub secret_key: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignRequest {
    pub secret_key: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyRequest {
    pub public_key: Option<String>,
    pub message: Option<String>,
    pub signature: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/solana/generate-wallet", post(generate_wallet))
        .route("/solana/balance/:public_key", get(get_balance))
        .route("/solana/tokens/:public_key", get(get_tokens))
        .route("/solana/transfer", post(transfer))
        .route("/solana/sign", post(sign))
        .route("/solana/verify", post(verify))
}

async fn generate_wallet(State(state): State<AppState>) -> ApiResult<Json<GeneratedWallet>> {
    state
        .app
        .solana()
        .generate_wallet()
        .map(Json)
        .map_err(|e| ApiError::with_context(e, "Failed to generate wallet"))
}

async fn get_balance(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> ApiResult<Json<Value>> {
    let balance = state
        .app
        .solana()
        .get_sol_balance(&public_key)
        .await
        .map_err(|e| ApiError::with_context(e, "Failed to get SOL balance"))?;
    Ok(Json(json!({ "balance": balance })))
}

async fn get_tokens(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> ApiResult<Json<Vec<TokenBalance>>> {
    state
        .app
        .solana()
        .get_token_balances(&public_key)
        .await
        .map(Json)
        .map_err(|e| ApiError::with_context(e, "Failed to get token balances"))
}

async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let secret_key = required(body.secret_key)?;
    let recipient = required(body.recipient)?;
    // Zero counts as missing.
    let amount = body
        .amount
        .filter(|a| *a != 0.0)
        .ok_or_else(ApiError::missing_fields)?;

    let signature = state
        .app
        .solana()
        .transfer_sol(&secret_key, &recipient, amount)
        .await
        .map_err(|e| ApiError::with_context(e, "Failed to transfer SOL"))?;
    Ok(Json(json!({ "signature": signature })))
}

async fn sign(
    State(state): State<AppState>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let secret_key = required(body.secret_key)?;
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(ApiError::missing_fields)?;

    let signature = state
        .app
        .solana()
        .sign_message(&secret_key, &message)
        .map_err(|e| ApiError::with_context(e, "Failed to sign message"))?;
    Ok(Json(json!({ "signature": signature })))
}

async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let public_key = required(body.public_key)?;
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let signature = required(body.signature)?;

    let is_valid = state
        .app
        .solana()
        .verify_signature(&public_key, &message, &signature)
        .map_err(|e| ApiError::with_context(e, "Failed to verify signature"))?;
    Ok(Json(json!({ "isValid": is_valid })))
}
