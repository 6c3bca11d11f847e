use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        error::AuthError,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Debug listing; no auth gate.
pub fn listing_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        warn!(error = %rejection, "rejected request body");
        AuthError::BadRequest(rejection.body_text())
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let user = state.auth.register(body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "user registered",
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let user = state.auth.login(body(payload)?).await?;
    Ok(Json(AuthResponse {
        message: "login successful",
        user,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AuthError> {
    Ok(Json(state.auth.list_users().await?))
}
