use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
mod password;
pub mod repo_types;
pub mod services;

pub fn router(expose_user_listing: bool) -> Router<AppState> {
    let router = Router::new().merge(handlers::auth_routes());
    if expose_user_listing {
        router.merge(handlers::listing_routes())
    } else {
        router
    }
}
