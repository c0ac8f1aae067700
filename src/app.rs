use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

pub fn router(state: AppState, upload_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/register", post(handlers::register))
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/chart", get(handlers::chart))
        .with_state(state)
}
