use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no authentication required
    let public = Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/metrics", get(handlers::system::render));

    // API routes: require Bearer token when API_TOKEN is set
    let protected = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/tokens/:contract/report", get(handlers::report::token_report))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Read-only API: any origin may fetch reports
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
