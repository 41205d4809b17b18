//! Stripe-Backed Gateway
//!
//! Implements [`PaymentGateway`] against the Stripe API: hosted checkout
//! session creation, session and subscription lookups for the download
//! gate, and webhook verification with the endpoint's signing secret.

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionPaymentMethodTypes,
    CreateCheckoutSessionSubscriptionData, StripeError, Subscription as StripeSubscription,
    SubscriptionId,
};

use crate::error::{PaymentError, Result};
use crate::gateway::{
    CheckoutParams, CheckoutSession, PaymentGateway, SessionInfo, SubscriptionInfo,
    SubscriptionStatus,
};
use crate::signature;
use crate::webhook::WebhookEvent;

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
    price_id: String,
    webhook_secret: String,
}

impl StripeGateway {
    /// Create a new gateway for a fixed subscription price.
    pub fn new(secret_key: &str, price_id: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            price_id: price_id.to_string(),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let price_id = std::env::var("STRIPE_PRICE_ID")
            .map_err(|_| PaymentError::Config("STRIPE_PRICE_ID not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &price_id, &webhook_secret))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_subscription_session(&self, params: CheckoutParams) -> Result<CheckoutSession> {
        let mut create = CreateCheckoutSession::new();
        create.mode = Some(CheckoutSessionMode::Subscription);
        create.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        create.customer_email = Some(&params.customer_email);
        create.success_url = Some(&params.success_url);
        create.cancel_url = Some(&params.cancel_url);

        create.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(self.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);

        // Caller metadata rides on the subscription so it is available when
        // provisioning off webhook events later.
        create.subscription_data = Some(CreateCheckoutSessionSubscriptionData {
            metadata: Some(params.metadata.clone()),
            ..Default::default()
        });

        let session = StripeCheckoutSession::create(&self.client, create)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("no checkout URL returned".into()))?;

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn session(&self, session_id: &str) -> Result<Option<SessionInfo>> {
        // An id Stripe would never have issued cannot name a session.
        let Ok(id) = session_id.parse::<CheckoutSessionId>() else {
            return Ok(None);
        };

        match StripeCheckoutSession::retrieve(&self.client, &id, &[]).await {
            Ok(session) => Ok(Some(SessionInfo {
                id: session.id.to_string(),
                subscription_id: session.subscription.map(|s| s.id().to_string()),
            })),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(PaymentError::Stripe(err.to_string())),
        }
    }

    async fn subscription(&self, subscription_id: &str) -> Result<Option<SubscriptionInfo>> {
        let Ok(id) = subscription_id.parse::<SubscriptionId>() else {
            return Ok(None);
        };

        match StripeSubscription::retrieve(&self.client, &id, &[]).await {
            Ok(subscription) => Ok(Some(SubscriptionInfo {
                id: subscription.id.to_string(),
                status: map_status(subscription.status),
            })),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(PaymentError::Stripe(err.to_string())),
        }
    }

    fn verify_webhook(&self, payload: &[u8], header: &str) -> Result<WebhookEvent> {
        signature::verify_signature(payload, header, &self.webhook_secret)?;
        WebhookEvent::from_payload(payload)
    }
}

fn is_not_found(err: &StripeError) -> bool {
    matches!(err, StripeError::Stripe(request) if request.http_status == 404)
}

fn map_status(status: stripe::SubscriptionStatus) -> SubscriptionStatus {
    use stripe::SubscriptionStatus as Remote;

    match status {
        Remote::Active => SubscriptionStatus::Active,
        Remote::Trialing => SubscriptionStatus::Trialing,
        Remote::PastDue => SubscriptionStatus::PastDue,
        Remote::Canceled => SubscriptionStatus::Canceled,
        Remote::Incomplete => SubscriptionStatus::Incomplete,
        Remote::IncompleteExpired => SubscriptionStatus::IncompleteExpired,
        Remote::Unpaid => SubscriptionStatus::Unpaid,
        Remote::Paused => SubscriptionStatus::Paused,
    }
}
