use super::{handlers, AppState};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predit/text", post(handlers::detect_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
