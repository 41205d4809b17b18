// Integration tests for cvlift-server
//
// HTTP-level tests using tower::ServiceExt::oneshot to exercise the full
// Axum router without starting a real TCP server. Provider state is
// scripted through MockGateway.

use std::io::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use cvlift_payments::{MockGateway, SubscriptionStatus};
use cvlift_server::config::{Config, DEFAULT_PORT};
use cvlift_server::deliverable::StaticDeliverable;
use cvlift_server::router;
use cvlift_server::state::AppState;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";
const DELIVERABLE: &[u8] = b"%PDF-1.4 cvlift test deliverable";

struct TestApp {
    gateway: Arc<MockGateway>,
    app: Router,
    // Held so the deliverable file outlives the requests that stream it.
    _deliverable: tempfile::NamedTempFile,
}

fn test_app() -> TestApp {
    let mut deliverable = tempfile::NamedTempFile::new().expect("temp deliverable");
    deliverable.write_all(DELIVERABLE).expect("write deliverable");

    let gateway = Arc::new(MockGateway::with_webhook_secret(WEBHOOK_SECRET));
    let config = Config {
        stripe_secret_key: "sk_test_x".into(),
        stripe_price_id: "price_x".into(),
        stripe_webhook_secret: WEBHOOK_SECRET.into(),
        domain: "http://localhost:4242".into(),
        port: DEFAULT_PORT,
        deliverable_path: deliverable.path().to_path_buf(),
    };

    let app = router(AppState {
        gateway: gateway.clone(),
        deliverables: Arc::new(StaticDeliverable::new(deliverable.path())),
        config: Arc::new(config),
    });

    TestApp {
        gateway,
        app,
        _deliverable: deliverable,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_webhook(app: &Router, body: &[u8], signature: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method("POST").uri("/webhook");
    if let Some(signature) = signature {
        request = request.header("stripe-signature", signature);
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::from(body.to_vec())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

/// Sign a payload the way Stripe would for our endpoint secret.
fn sign(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let timestamp = chrono::Utc::now().timestamp();
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

// ─── Download gate ──────────────────────────────────────────────────

#[tokio::test]
async fn download_without_session_id_is_400() {
    let t = test_app();

    let (status, body) = get(&t.app, "/download").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Missing session_id.");
}

#[tokio::test]
async fn download_with_unknown_session_is_403() {
    let t = test_app();

    let (status, body) = get(&t.app, "/download?session_id=missing").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(String::from_utf8_lossy(&body).contains("Payment not found"));
}

#[tokio::test]
async fn download_with_unpaid_session_is_403() {
    let t = test_app();
    // Session exists, but checkout never completed so no subscription hangs
    // off it.
    t.gateway.insert_session("cs_pending", None);

    let (status, body) = get(&t.app, "/download?session_id=cs_pending").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(String::from_utf8_lossy(&body).contains("Payment not found"));
}

#[tokio::test]
async fn download_with_inactive_subscription_is_403() {
    let t = test_app();
    t.gateway.insert_session("cs_1", Some("sub_1"));
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::Canceled);

    let (status, body) = get(&t.app, "/download?session_id=cs_1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(String::from_utf8_lossy(&body).contains("Subscription not active"));
}

#[tokio::test]
async fn download_with_active_subscription_streams_the_file() {
    let t = test_app();
    t.gateway.insert_session("cs_1", Some("sub_1"));
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::Active);

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download?session_id=cs_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"Optimized-CV.pdf\""
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), DELIVERABLE);
}

#[tokio::test]
async fn download_with_trialing_subscription_is_allowed() {
    let t = test_app();
    t.gateway.insert_session("cs_1", Some("sub_1"));
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::Trialing);

    let (status, body) = get(&t.app, "/download?session_id=cs_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, DELIVERABLE);
}

#[tokio::test]
async fn repeat_downloads_stay_allowed_while_active() {
    let t = test_app();
    t.gateway.insert_session("cs_1", Some("sub_1"));
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::Active);

    for _ in 0..3 {
        let (status, _) = get(&t.app, "/download?session_id=cs_1").await;
        assert_eq!(status, StatusCode::OK);
    }

    // Status is re-verified per request, not remembered from the last grant.
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::PastDue);
    let (status, _) = get(&t.app, "/download?session_id=cs_1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn download_during_provider_outage_is_500() {
    let t = test_app();
    t.gateway.insert_session("cs_1", Some("sub_1"));
    t.gateway.insert_subscription("sub_1", SubscriptionStatus::Active);
    t.gateway.fail_upstream(true);

    let (status, body) = get(&t.app, "/download?session_id=cs_1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Server error.");
}

// ─── Checkout session initiator ─────────────────────────────────────

#[tokio::test]
async fn checkout_requires_an_email() {
    let t = test_app();

    let (status, _) = post_json(&t.app, "/create-checkout-session", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        post_json(&t.app, "/create-checkout-session", r#"{"email":"not-an-email"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["message"].is_string());

    assert_eq!(t.gateway.created_sessions(), 0, "no session may be created on invalid input");
}

#[tokio::test]
async fn checkout_returns_the_hosted_page_url() {
    let t = test_app();

    let (status, body) = post_json(
        &t.app,
        "/create-checkout-session",
        r#"{"email":"a@b.com","metadata":{"_note":"cv_download_request"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn checkout_is_not_idempotent() {
    let t = test_app();
    let payload = r#"{"email":"a@b.com","metadata":{}}"#;

    let (_, first) = post_json(&t.app, "/create-checkout-session", payload).await;
    let (_, second) = post_json(&t.app, "/create-checkout-session", payload).await;

    let first: serde_json::Value = serde_json::from_slice(&first).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&second).unwrap();
    assert_ne!(first["url"], second["url"]);
    assert_eq!(t.gateway.created_sessions(), 2);
}

#[tokio::test]
async fn checkout_provider_failure_is_500_with_message() {
    let t = test_app();
    t.gateway.fail_upstream(true);

    let (status, body) =
        post_json(&t.app, "/create-checkout-session", r#"{"email":"a@b.com"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["message"].is_string());
}

// ─── Webhook receiver ───────────────────────────────────────────────

#[tokio::test]
async fn webhook_without_signature_header_is_400() {
    let t = test_app();

    let (status, body) =
        post_webhook(&t.app, br#"{"type":"invoice.paid"}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).starts_with("Webhook Error:"));
}

#[tokio::test]
async fn webhook_with_invalid_signature_is_400() {
    let t = test_app();
    let payload = br#"{"type":"invoice.paid"}"#;
    let signature = sign(payload, "whsec_wrong_secret");

    let (status, body) = post_webhook(&t.app, payload, Some(&signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).starts_with("Webhook Error:"));
}

#[tokio::test]
async fn webhook_with_tampered_body_is_400() {
    let t = test_app();
    let payload = br#"{"type":"invoice.paid","amount":1000}"#;
    let signature = sign(payload, WEBHOOK_SECRET);

    let tampered = br#"{"type":"invoice.paid","amount":9000}"#;
    let (status, body) = post_webhook(&t.app, tampered, Some(&signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).starts_with("Webhook Error:"));
}

#[tokio::test]
async fn webhook_acknowledges_every_verified_event() {
    let t = test_app();

    let payloads: [&[u8]; 4] = [
        br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_test_1"}}}"#,
        br#"{"type":"invoice.paid","data":{"object":{}}}"#,
        br#"{"type":"invoice.payment_failed","data":{"object":{}}}"#,
        br#"{"type":"some.future.event","data":{"object":{}}}"#,
    ];

    for payload in payloads {
        let signature = sign(payload, WEBHOOK_SECRET);
        let (status, body) = post_webhook(&t.app, payload, Some(&signature)).await;

        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "received": true }));
    }
}

// ─── Health ─────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let t = test_app();

    let (status, body) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["stripe_configured"], true);
}
