//! Download Gating
//!
//! The deliverable is released if and only if the checkout session's
//! subscription is currently active or trialing. The decision is never
//! cached: every call performs both provider lookups again, so a lapsed
//! subscription locks the file immediately and an active one can re-download
//! at will.

use thiserror::Error;

use crate::error::PaymentError;
use crate::gateway::{PaymentGateway, SubscriptionStatus};

/// Proof that a download request passed all gating checks
#[derive(Clone, Debug)]
pub struct DownloadGrant {
    pub session_id: String,
    pub subscription_id: String,
    pub status: SubscriptionStatus,
}

/// Why a download request was refused
#[derive(Error, Debug)]
pub enum AccessError {
    /// No session identifier on the request
    #[error("missing session_id")]
    MissingSessionId,

    /// Session unknown to the provider, or no subscription attached to it
    #[error("no completed payment found for session")]
    PaymentNotFound,

    /// Subscription exists but its status does not entitle a download
    #[error("subscription not active")]
    SubscriptionInactive { status: SubscriptionStatus },

    /// Unexpected provider failure during either lookup
    #[error(transparent)]
    Upstream(#[from] PaymentError),
}

/// Run the gating checks for a download request.
///
/// Three checks, short-circuiting on first failure:
///
/// 1. a session id is present,
/// 2. the session exists and references a subscription,
/// 3. that subscription's status is in the allowed set.
pub async fn authorize_download(
    gateway: &dyn PaymentGateway,
    session_id: Option<&str>,
) -> Result<DownloadGrant, AccessError> {
    let session_id = match session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(AccessError::MissingSessionId),
    };

    let session = gateway
        .session(session_id)
        .await?
        .ok_or(AccessError::PaymentNotFound)?;

    let subscription_id = session
        .subscription_id
        .ok_or(AccessError::PaymentNotFound)?;

    // A session pointing at a subscription the provider does not know is a
    // provider anomaly, not an ordinary lapsed status.
    let subscription = gateway
        .subscription(&subscription_id)
        .await?
        .ok_or_else(|| {
            PaymentError::Stripe(format!(
                "subscription {subscription_id} referenced by session {session_id} not found"
            ))
        })?;

    if !subscription.status.is_entitled() {
        tracing::debug!(
            %session_id,
            %subscription_id,
            status = %subscription.status,
            "refusing download for inactive subscription"
        );
        return Err(AccessError::SubscriptionInactive {
            status: subscription.status,
        });
    }

    Ok(DownloadGrant {
        session_id: session.id,
        subscription_id,
        status: subscription.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGateway;

    #[tokio::test]
    async fn missing_session_id_is_rejected_before_any_lookup() {
        let gateway = MockGateway::new();

        let err = authorize_download(&gateway, None).await.unwrap_err();
        assert!(matches!(err, AccessError::MissingSessionId));

        let err = authorize_download(&gateway, Some("")).await.unwrap_err();
        assert!(matches!(err, AccessError::MissingSessionId));

        let err = authorize_download(&gateway, Some("   ")).await.unwrap_err();
        assert!(matches!(err, AccessError::MissingSessionId));
    }

    #[tokio::test]
    async fn unknown_session_never_releases_the_file() {
        let gateway = MockGateway::new();

        let err = authorize_download(&gateway, Some("cs_missing")).await.unwrap_err();
        assert!(matches!(err, AccessError::PaymentNotFound));
    }

    #[tokio::test]
    async fn session_without_subscription_is_payment_not_found() {
        let gateway = MockGateway::new();
        gateway.insert_session("cs_open", None);

        let err = authorize_download(&gateway, Some("cs_open")).await.unwrap_err();
        assert!(matches!(err, AccessError::PaymentNotFound));
    }

    #[tokio::test]
    async fn dangling_subscription_reference_is_an_upstream_error() {
        let gateway = MockGateway::new();
        gateway.insert_session("cs_1", Some("sub_gone"));

        let err = authorize_download(&gateway, Some("cs_1")).await.unwrap_err();
        assert!(matches!(err, AccessError::Upstream(_)));
    }

    #[tokio::test]
    async fn every_non_entitled_status_is_refused() {
        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::IncompleteExpired,
            SubscriptionStatus::Unpaid,
            SubscriptionStatus::Paused,
        ] {
            let gateway = MockGateway::new();
            gateway.insert_session("cs_1", Some("sub_1"));
            gateway.insert_subscription("sub_1", status.clone());

            let err = authorize_download(&gateway, Some("cs_1")).await.unwrap_err();
            assert!(
                matches!(err, AccessError::SubscriptionInactive { .. }),
                "status {status} must be refused"
            );
        }
    }

    #[tokio::test]
    async fn active_and_trialing_are_granted() {
        for status in [SubscriptionStatus::Active, SubscriptionStatus::Trialing] {
            let gateway = MockGateway::new();
            gateway.insert_session("cs_1", Some("sub_1"));
            gateway.insert_subscription("sub_1", status.clone());

            let grant = authorize_download(&gateway, Some("cs_1")).await.expect("granted");
            assert_eq!(grant.session_id, "cs_1");
            assert_eq!(grant.subscription_id, "sub_1");
            assert_eq!(grant.status, status);
        }
    }

    #[tokio::test]
    async fn decision_is_reverified_on_every_call() {
        let gateway = MockGateway::new();
        gateway.insert_session("cs_1", Some("sub_1"));
        gateway.insert_subscription("sub_1", SubscriptionStatus::Active);

        authorize_download(&gateway, Some("cs_1")).await.expect("granted");

        // The subscription lapses between requests; the next call must see it.
        gateway.insert_subscription("sub_1", SubscriptionStatus::Canceled);
        let err = authorize_download(&gateway, Some("cs_1")).await.unwrap_err();
        assert!(matches!(err, AccessError::SubscriptionInactive { .. }));
    }

    #[tokio::test]
    async fn provider_outage_is_surfaced_as_upstream() {
        let gateway = MockGateway::new();
        gateway.insert_session("cs_1", Some("sub_1"));
        gateway.insert_subscription("sub_1", SubscriptionStatus::Active);
        gateway.fail_upstream(true);

        let err = authorize_download(&gateway, Some("cs_1")).await.unwrap_err();
        assert!(matches!(err, AccessError::Upstream(_)));
    }
}
