use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod replies;

pub fn router() -> Router<AppState> {
    handlers::chat_routes()
}
