// HTTP surface over the task runner and the audio store.

mod error;
mod handlers;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/corrections", post(handlers::submit_correction))
        .route("/api/v1/corrections/{task_id}", get(handlers::correction_status))
        .route(
            "/api/v1/corrections/{task_id}/result",
            get(handlers::correction_result),
        )
        .route(
            "/api/v1/corrections/{task_id}/cancel",
            post(handlers::cancel_correction),
        )
        .route("/api/v1/audio/{reference}", get(handlers::fetch_audio))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
