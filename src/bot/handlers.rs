use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument, warn};

use crate::{
    auth::dto::ErrorBody,
    bot::dto::{ChatRequest, ChatResponse},
    state::AppState,
};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/greeting", get(greeting))
}

type ChatError = (StatusCode, Json<ErrorBody>);

fn bad_request(msg: impl Into<String>) -> ChatError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg.into() }))
}

#[instrument(skip(state))]
pub async fn greeting(State(state): State<AppState>) -> Json<ChatResponse> {
    Json(ChatResponse {
        reply: state.bot.greeting().to_string(),
    })
}

#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "rejected chat body");
        bad_request(e.body_text())
    })?;

    let message = req.message.trim();
    if message.is_empty() {
        return Err(bad_request("message is required"));
    }

    let reply = state.bot.reply(message);
    debug!(len = message.len(), "chat reply sent");
    Ok(Json(ChatResponse { reply }))
}
