use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints any client may call without a token. Only summary data is served here.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and container orchestration.
        .route("/health", get(|| async { "ok" }))
        // GET /drinks
        // Lists every drink as `{id, title}`.
        .route("/drinks", get(handlers::get_drinks))
}
