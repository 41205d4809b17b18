//! # cvlift-payments
//!
//! Stripe integration and subscription gating for cvlift.
//!
//! The flow is the "Stripe Checkout (Hosted)" approach:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Landing    │────▶│  Stripe Hosted  │────▶│  /download?      │
//! │  page       │     │  Checkout Page  │     │  session_id=...  │
//! └─────────────┘     └─────────────────┘     └──────────────────┘
//! ```
//!
//! The server never collects payment details itself. It creates a
//! subscription-mode checkout session, Stripe redirects the buyer back with
//! the session id, and [`authorize_download`] re-verifies on every request
//! that the session's subscription is still active or trialing before the
//! deliverable is released. Nothing is cached or persisted between
//! requests.
//!
//! All provider access goes through the [`PaymentGateway`] trait so the
//! gating logic can be exercised against [`MockGateway`] without touching
//! the Stripe API.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cvlift_payments::{CheckoutParams, PaymentGateway, StripeGateway, authorize_download};
//!
//! let gateway = StripeGateway::from_env()?;
//!
//! let session = gateway.create_subscription_session(CheckoutParams {
//!     customer_email: "user@example.com".into(),
//!     metadata: Default::default(),
//!     success_url: "https://yoursite.com/download?session_id={CHECKOUT_SESSION_ID}".into(),
//!     cancel_url: "https://yoursite.com/?canceled=true".into(),
//! }).await?;
//!
//! // Redirect the buyer to: session.url
//!
//! // Later, when they come back:
//! let grant = authorize_download(&gateway, Some(&session.id)).await?;
//! ```

mod access;
mod error;
mod gateway;
mod mock;
mod signature;
mod stripe_gateway;
mod webhook;

pub use access::{AccessError, DownloadGrant, authorize_download};
pub use error::{PaymentError, Result};
pub use gateway::{
    CheckoutParams, CheckoutSession, PaymentGateway, SessionInfo, SubscriptionInfo,
    SubscriptionStatus,
};
pub use mock::MockGateway;
pub use signature::verify_signature;
pub use stripe_gateway::StripeGateway;
pub use webhook::{WebhookEvent, dispatch};
