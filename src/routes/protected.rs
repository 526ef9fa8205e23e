use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Protected Router Module
///
/// Every handler registered here takes an `Authorized<P>` extractor, so the bearer token is
/// verified and permission `P` checked before the handler body (or its request body) runs.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // GET /drinks-detail
        // Full recipes. Requires `get:drinks-detail`.
        .route("/drinks-detail", get(handlers::get_drinks_detail))
        // POST /drinks
        // Creates a drink. Requires `post:drinks`.
        .route("/drinks", post(handlers::create_drink))
        // PATCH/DELETE /drinks/{id}
        // Wholesale update requires `patch:drinks`; removal requires `delete:drinks`.
        .route(
            "/drinks/{id}",
            patch(handlers::update_drink).delete(handlers::delete_drink),
        )
}
