pub mod dto;
pub mod handlers;
pub mod repo;
mod steps;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::onboarding_routes())
        .merge(handlers::profile_routes())
}
