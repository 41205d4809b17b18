//! cvlift HTTP Server
//!
//! Axum-based server for the CV optimizer demo: creates Stripe checkout
//! sessions, gates the deliverable download behind subscription status,
//! receives Stripe webhooks, and hosts the WASM landing page.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cvlift_payments::StripeGateway;
use cvlift_server::config::Config;
use cvlift_server::deliverable::StaticDeliverable;
use cvlift_server::router;
use cvlift_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    if !config.deliverable_path.exists() {
        tracing::warn!(
            path = %config.deliverable_path.display(),
            "deliverable file not found - downloads will fail until it exists"
        );
    }

    let gateway = StripeGateway::new(
        &config.stripe_secret_key,
        &config.stripe_price_id,
        &config.stripe_webhook_secret,
    );
    tracing::info!("Stripe gateway configured");

    let port = config.port;
    let state = AppState {
        gateway: Arc::new(gateway),
        deliverables: Arc::new(StaticDeliverable::new(&config.deliverable_path)),
        config: Arc::new(config),
    };

    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("cvlift server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  POST /create-checkout-session - Start a subscription checkout");
    tracing::info!("  GET  /download                - Gated deliverable download");
    tracing::info!("  POST /webhook                 - Stripe webhook receiver");

    axum::serve(listener, app).await?;

    Ok(())
}
