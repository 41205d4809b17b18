//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_util::io::ReaderStream;

use cvlift_payments::{AccessError, CheckoutParams, authorize_download, dispatch};

use crate::state::AppState;

/// The filename buyers see, independent of where the file lives on disk.
const DOWNLOAD_FILENAME: &str = "Optimized-CV.pdf";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub email: String,

    /// Opaque metadata forwarded onto the subscription
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutSessionResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: !state.config.stripe_secret_key.is_empty(),
    })
}

/// Create a subscription checkout session and hand back the hosted page URL.
///
/// Not idempotent: every call creates a new session on the provider side.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, (StatusCode, Json<ErrorMessage>)> {
    let email = payload.email.trim();
    if !is_plausible_email(email) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorMessage {
                message: "A valid email address is required.".into(),
            }),
        ));
    }

    let params = CheckoutParams {
        customer_email: email.to_string(),
        metadata: payload.metadata,
        success_url: state.config.success_url(),
        cancel_url: state.config.cancel_url(),
    };

    let session = state
        .gateway
        .create_subscription_session(params)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to create checkout session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage {
                    message: err.to_string(),
                }),
            )
        })?;

    Ok(Json(CreateCheckoutSessionResponse { url: session.url }))
}

/// Gate and serve the deliverable.
///
/// Verifies the checkout session and its subscription on every request,
/// then streams the file with a fixed download filename.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let grant = match authorize_download(state.gateway.as_ref(), query.session_id.as_deref()).await
    {
        Ok(grant) => grant,
        Err(err) => return access_error_response(&err),
    };

    tracing::info!(
        session_id = %grant.session_id,
        subscription_id = %grant.subscription_id,
        status = %grant.status,
        "serving deliverable"
    );

    let path = state.deliverables.resolve(&grant);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(
                error = %err,
                path = %path.display(),
                "failed to open deliverable"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error.").into_response();
        }
    };

    // Once headers are out, a mid-stream failure can only be logged; the
    // connection is cut and the buyer simply retries.
    let stream = ReaderStream::new(file).map(|chunk| {
        if let Err(err) = &chunk {
            tracing::error!(error = %err, "error streaming deliverable");
        }
        chunk
    });

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

fn access_error_response(err: &AccessError) -> Response {
    match err {
        AccessError::MissingSessionId => {
            (StatusCode::BAD_REQUEST, "Missing session_id.").into_response()
        }
        AccessError::PaymentNotFound => (
            StatusCode::FORBIDDEN,
            "Payment not found. Please complete subscription to download.",
        )
            .into_response(),
        AccessError::SubscriptionInactive { .. } => (
            StatusCode::FORBIDDEN,
            "Subscription not active. Please contact support.",
        )
            .into_response(),
        AccessError::Upstream(err) => {
            tracing::error!(error = %err, "payment provider error during download gating");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error.").into_response()
        }
    }
}

/// Stripe webhook endpoint.
///
/// Signature failures are a 400 and the payload is never dispatched. Once
/// verification passes we always acknowledge, even for event types we take
/// no action on, so the provider does not retry.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers.get("stripe-signature").and_then(|v| v.to_str().ok()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Webhook Error: missing stripe-signature header",
        )
            .into_response();
    };

    let event = match state.gateway.verify_webhook(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "webhook verification failed");
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {err}")).into_response();
        }
    };

    dispatch(&event);

    Json(serde_json::json!({ "received": true })).into_response()
}

/// Presence plus a minimal `local@domain` shape check. Anything stricter is
/// the provider's problem; its checkout form re-validates anyway.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_plausible_email("a@b.com"));
        assert!(is_plausible_email("first.last@sub.domain.co"));

        assert!(!is_plausible_email(""));
        assert!(!is_plausible_email("   "));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@domain.com"));
        assert!(!is_plausible_email("local@"));
        assert!(!is_plausible_email("a@b@c"));
    }
}
