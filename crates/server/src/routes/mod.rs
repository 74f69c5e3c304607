pub mod health;
pub mod metrics;
mod query;

use axum::{Router, routing::post};

use crate::AppState;

/// Build query routes
pub fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::run))
        .route("/query/preview", post(query::preview))
}
