use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, sessions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Items
        .route("/items", get(handlers::list_items))
        // Sessions
        .route("/sessions", post(sessions::open_session))
        .route("/sessions/{id}", get(sessions::get_session))
        .route("/sessions/{id}/select", post(sessions::select))
        .route("/sessions/{id}/place", post(sessions::place))
        .route("/sessions/{id}/slots/{slot}", delete(sessions::remove_from_slot))
        .route("/sessions/{id}/undo", post(sessions::undo))
        .route("/sessions/{id}/complete", post(sessions::complete))
        .route("/sessions/{id}/reset", post(sessions::reset))
        .route("/sessions/{id}/shuffle", post(sessions::shuffle))
        .route("/sessions/{id}/unlock", post(sessions::unlock))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
