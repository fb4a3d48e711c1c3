use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use whale_watch_core::models::user::{LinkWalletRequest, NewUser, User, UserUpdate};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/:id",
            get(get_user).post(create_user_with_id).patch(update_user),
        )
        .route("/users/:id/wallets", post(link_wallet))
        .route("/users/:id/login", post(record_login))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    Ok(Json(state.app.users().get_user(&id).await?))
}

/// Signup with the uid in the body.
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(body) = payload?;
    let user = state.app.users().create_user(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Signup with the uid in the path; a uid in the body is ignored.
async fn create_user_with_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(body) = payload?;
    let input = NewUser {
        uid: Some(id),
        ..body
    };
    let user = state.app.users().create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(body) = payload?;
    Ok(Json(state.app.users().update_user(&id, body).await?))
}

async fn link_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LinkWalletRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(body) = payload?;
    Ok(Json(state.app.users().link_wallet(&id, body).await?))
}

async fn record_login(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    Ok(Json(state.app.users().record_login(&id).await?))
}
