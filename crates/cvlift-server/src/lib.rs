//! cvlift HTTP Server
//!
//! Axum router wiring for the checkout, download-gate, and webhook
//! endpoints. The binary in `main.rs` loads config and serves this router;
//! integration tests drive it directly.

pub mod config;
pub mod deliverable;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{create_checkout_session, download, health_check, webhook};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        // Payments
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/download", get(download))
        .route("/webhook", post(webhook))
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
