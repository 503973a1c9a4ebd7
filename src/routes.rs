use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))

        // Chat
        .route("/chat", post(handlers::chat))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
}

/// Full application: routes, permissive CORS with credentials, request tracing
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
