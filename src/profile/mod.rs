use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod model;
mod repo;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::profile_routes())
}
