//! Stripe Webhook Events
//!
//! Events arrive as a signed JSON body with a `type` tag and an otherwise
//! opaque payload. After signature verification the body is parsed into
//! [`WebhookEvent`] and dispatched. Unrecognized types are logged and
//! acknowledged; an unacknowledged delivery is retried by the provider, so
//! even no-op handlers must ack.

use serde_json::Value;

use crate::error::{PaymentError, Result};

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A checkout session finished successfully
    CheckoutCompleted { session_id: String },

    /// Recurring payment succeeded
    InvoicePaid,

    /// Recurring payment failed
    InvoicePaymentFailed,

    /// Unhandled event type
    Other { event_type: String },
}

impl WebhookEvent {
    /// Parse a verified webhook body.
    ///
    /// Only the `type` tag and, for completed checkouts, the object id are
    /// read; the rest of the payload stays opaque.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let body: Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::WebhookParse(e.to_string()))?;

        let event_type = body
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| PaymentError::WebhookParse("event has no type tag".into()))?;

        Ok(match event_type {
            "checkout.session.completed" => {
                let session_id = body
                    .pointer("/data/object/id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                WebhookEvent::CheckoutCompleted { session_id }
            }
            "invoice.paid" => WebhookEvent::InvoicePaid,
            "invoice.payment_failed" => WebhookEvent::InvoicePaymentFailed,
            other => WebhookEvent::Other {
                event_type: other.to_string(),
            },
        })
    }
}

/// Act on a verified event.
///
/// This demo holds no state of its own, so every arm is an extension point:
/// provisioning on completed checkouts, dunning on failed invoices, and so
/// on would hang off the matches below.
pub fn dispatch(event: &WebhookEvent) {
    match event {
        WebhookEvent::CheckoutCompleted { session_id } => {
            tracing::info!(%session_id, "checkout session completed");
        }
        WebhookEvent::InvoicePaid => {
            tracing::debug!("recurring payment succeeded");
        }
        WebhookEvent::InvoicePaymentFailed => {
            tracing::warn!("recurring payment failed");
        }
        WebhookEvent::Other { event_type } => {
            tracing::debug!(%event_type, "unhandled webhook event");
        }
    }
}
