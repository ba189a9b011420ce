//! Shared catalogs: dietary preferences and food categories.

pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::preference_routes())
        .merge(handlers::category_routes())
}
