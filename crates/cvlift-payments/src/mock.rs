//! Mock Payment Gateway
//!
//! For testing and demo purposes. Sessions and subscriptions live in
//! in-memory tables; webhook verification runs the real signature code
//! path against a configurable secret.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::{PaymentError, Result};
use crate::gateway::{
    CheckoutParams, CheckoutSession, PaymentGateway, SessionInfo, SubscriptionInfo,
    SubscriptionStatus,
};
use crate::signature;
use crate::webhook::WebhookEvent;

/// In-memory gateway with scriptable provider state
pub struct MockGateway {
    /// session id → subscription reference (None until checkout completes)
    sessions: Mutex<HashMap<String, Option<String>>>,
    subscriptions: Mutex<HashMap<String, SubscriptionStatus>>,
    created: AtomicU64,
    fail_upstream: AtomicBool,
    webhook_secret: String,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::with_webhook_secret("whsec_mock")
    }

    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            created: AtomicU64::new(0),
            fail_upstream: AtomicBool::new(false),
            webhook_secret: secret.into(),
        }
    }

    /// Register a session, optionally already linked to a subscription.
    pub fn insert_session(&self, id: &str, subscription_id: Option<&str>) {
        self.sessions
            .lock()
            .expect("mock sessions lock")
            .insert(id.to_string(), subscription_id.map(str::to_string));
    }

    /// Register or overwrite a subscription's status.
    pub fn insert_subscription(&self, id: &str, status: SubscriptionStatus) {
        self.subscriptions
            .lock()
            .expect("mock subscriptions lock")
            .insert(id.to_string(), status);
    }

    /// Number of checkout sessions created through this gateway.
    pub fn created_sessions(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// When set, lookups and session creation fail like a provider outage.
    pub fn fail_upstream(&self, fail: bool) {
        self.fail_upstream.store(fail, Ordering::SeqCst);
    }

    fn check_upstream(&self) -> Result<()> {
        if self.fail_upstream.load(Ordering::SeqCst) {
            return Err(PaymentError::Stripe("injected provider outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_subscription_session(&self, params: CheckoutParams) -> Result<CheckoutSession> {
        self.check_upstream()?;

        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("cs_test_{n}");
        self.insert_session(&id, None);

        tracing::debug!(session_id = %id, email = %params.customer_email, "mock checkout session created");

        Ok(CheckoutSession {
            url: format!("https://checkout.example.com/pay/{id}"),
            id,
        })
    }

    async fn session(&self, session_id: &str) -> Result<Option<SessionInfo>> {
        self.check_upstream()?;

        Ok(self
            .sessions
            .lock()
            .expect("mock sessions lock")
            .get(session_id)
            .map(|subscription_id| SessionInfo {
                id: session_id.to_string(),
                subscription_id: subscription_id.clone(),
            }))
    }

    async fn subscription(&self, subscription_id: &str) -> Result<Option<SubscriptionInfo>> {
        self.check_upstream()?;

        Ok(self
            .subscriptions
            .lock()
            .expect("mock subscriptions lock")
            .get(subscription_id)
            .map(|status| SubscriptionInfo {
                id: subscription_id.to_string(),
                status: status.clone(),
            }))
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        signature::verify_signature(payload, signature, &self.webhook_secret)?;
        WebhookEvent::from_payload(payload)
    }
}
