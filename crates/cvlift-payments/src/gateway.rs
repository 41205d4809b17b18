//! Payment Gateway Abstraction
//!
//! Narrow port over the payment provider. [`StripeGateway`] is the real
//! implementation; [`MockGateway`] backs the tests.
//!
//! [`StripeGateway`]: crate::StripeGateway
//! [`MockGateway`]: crate::MockGateway

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::webhook::WebhookEvent;

/// Payment provider trait
///
/// Everything the download flow needs from the provider: create a hosted
/// checkout session, look up a session and its subscription, and verify an
/// inbound webhook. Implement this for each provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a subscription-mode checkout session.
    ///
    /// Each call creates a new remote session; repeating a request yields a
    /// distinct session and URL.
    async fn create_subscription_session(&self, params: CheckoutParams) -> Result<CheckoutSession>;

    /// Look up a checkout session by id. `None` if the provider has no such
    /// session.
    async fn session(&self, session_id: &str) -> Result<Option<SessionInfo>>;

    /// Look up a subscription by id. `None` if the provider has no such
    /// subscription.
    async fn subscription(&self, subscription_id: &str) -> Result<Option<SubscriptionInfo>>;

    /// Verify an inbound webhook's signature against the shared secret and
    /// parse the event. The payload must not be acted on if this fails.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent>;
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutParams {
    /// Buyer email, shown pre-filled on the hosted page
    pub customer_email: String,

    /// Opaque caller metadata, attached to the resulting subscription
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// URL the provider redirects to after successful payment
    pub success_url: String,

    /// URL the provider redirects to if checkout is cancelled
    pub cancel_url: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session id
    pub id: String,

    /// Hosted checkout page to redirect the buyer to
    pub url: String,
}

/// A checkout session as read back from the provider
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub id: String,

    /// Subscription created by this session, absent until checkout
    /// completes
    pub subscription_id: Option<String>,
}

/// A subscription as read back from the provider
#[derive(Clone, Debug)]
pub struct SubscriptionInfo {
    pub id: String,
    pub status: SubscriptionStatus,
}

/// Provider-maintained subscription state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
    /// Forward-compatible escape hatch for statuses this build predates
    Other(String),
}

impl SubscriptionStatus {
    /// Whether this status entitles the subscriber to the deliverable.
    /// Exactly {active, trialing}.
    pub fn is_entitled(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entitlement_is_active_or_trialing_only() {
        assert!(SubscriptionStatus::Active.is_entitled());
        assert!(SubscriptionStatus::Trialing.is_entitled());

        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::IncompleteExpired,
            SubscriptionStatus::Unpaid,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Other("legacy".into()),
        ] {
            assert!(!status.is_entitled(), "{status} must not be entitled");
        }
    }
}
