//! Webhook Signature Verification
//!
//! Stripe signs webhook deliveries with a `stripe-signature` header of the
//! form `t=<unix ts>,v1=<hex hmac>`. The MAC is HMAC-SHA256 over
//! `"{t}.{raw body}"` under the endpoint's signing secret. Verification is
//! a pure function of (body, header, secret, now): any byte of the body
//! changing invalidates the signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Reject deliveries whose signed timestamp is further than this from now.
/// Stripe's documented default.
const TOLERANCE_SECS: i64 = 300;

/// Verify a webhook delivery against the signing secret.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> Result<()> {
    verify_signature_at(payload, header, secret, chrono::Utc::now().timestamp())
}

fn verify_signature_at(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<()> {
    let parsed = parse_header(header)?;

    if (now - parsed.timestamp).abs() > TOLERANCE_SECS {
        return Err(PaymentError::WebhookSignature(
            "timestamp outside tolerance".into(),
        ));
    }

    // The header may carry several v1 entries during secret rotation;
    // accept if any of them matches.
    for candidate in &parsed.v1_signatures {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| PaymentError::WebhookSignature(e.to_string()))?;
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::WebhookSignature("signature mismatch".into()))
}

struct ParsedHeader {
    timestamp: i64,
    v1_signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<ParsedHeader> {
    let mut timestamp: Option<i64> = None;
    let mut v1_signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => v1_signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::WebhookSignature("missing or invalid timestamp in signature header".into())
    })?;

    if v1_signatures.is_empty() {
        return Err(PaymentError::WebhookSignature(
            "missing v1 signature in signature header".into(),
        ));
    }

    Ok(ParsedHeader {
        timestamp,
        v1_signatures,
    })
}
