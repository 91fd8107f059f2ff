use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;

use crate::billing::stripe::StripeClient;
use crate::core::{ServiceError, ServiceResult};
use crate::supabase::SupabaseClient;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted distance between the signature timestamp and now.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// Header format: `t=<unix>,v1=<hex>[,v1=<hex>...]`. The signed payload is
/// `"{t}.{body}"`; any matching v1 signature within the timestamp tolerance
/// accepts the event.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(value)) => timestamp = value.parse().ok(),
            (Some("v1"), Some(value)) => {
                if let Ok(signature) = hex::decode(value) {
                    signatures.push(signature);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        ServiceError::BadRequest("missing timestamp in Stripe-Signature header".to_string())
    })?;
    if signatures.is_empty() {
        return Err(ServiceError::BadRequest(
            "no v1 signature in Stripe-Signature header".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ServiceError::Config("invalid webhook secret".to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok());
    if !matched {
        return Err(ServiceError::BadRequest(
            "signature verification failed".to_string(),
        ));
    }

    if (now.timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(ServiceError::BadRequest(
            "signature timestamp outside tolerance".to_string(),
        ));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventPayload,
}

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub object: Value,
}

/// Apply a verified webhook event to the user's profile. Unknown event types
/// are logged and acknowledged so Stripe does not retry them.
pub async fn handle_event(
    event: WebhookEvent,
    stripe: &StripeClient,
    supabase: &SupabaseClient,
) -> ServiceResult<()> {
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let object = &event.data.object;
            let user_id = object
                .pointer("/metadata/userId")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ServiceError::BadRequest("checkout session missing userId metadata".to_string())
                })?;
            let subscription_id =
                object.get("subscription").and_then(Value::as_str).ok_or_else(|| {
                    ServiceError::BadRequest("checkout session missing subscription".to_string())
                })?;

            let subscription = stripe.retrieve_subscription(subscription_id).await?;
            apply_subscription(supabase, user_id, &subscription).await
        }
        "invoice.payment_succeeded" => {
            let subscription_id = event
                .data
                .object
                .get("subscription")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ServiceError::BadRequest("invoice missing subscription".to_string())
                })?;

            let subscription = stripe.retrieve_subscription(subscription_id).await?;
            let user_id = subscription
                .metadata
                .get("userId")
                .cloned()
                .ok_or_else(|| {
                    ServiceError::BadRequest("subscription missing userId metadata".to_string())
                })?;
            apply_subscription(supabase, &user_id, &subscription).await
        }
        other => {
            tracing::warn!(event_type = other, "unhandled event type");
            Ok(())
        }
    }
}

async fn apply_subscription(
    supabase: &SupabaseClient,
    user_id: &str,
    subscription: &crate::billing::stripe::Subscription,
) -> ServiceResult<()> {
    let patch = json!({
        "subscription_status": subscription.status,
        "subscription_plan": subscription.plan_price_id(),
    });
    supabase.update_profile(user_id, &patch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let ts = now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, SECRET));
        assert!(verify_signature(payload, &header, SECRET, now()).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let ts = now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, SECRET));
        let err = verify_signature(b"{}", &header, SECRET, now()).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{}"#;
        let ts = now().timestamp();
        let header = format!("t={},v1={}", ts, sign(payload, ts, "whsec_other"));
        assert!(verify_signature(payload, &header, SECRET, now()).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = br#"{}"#;
        let ts = now().timestamp() - SIGNATURE_TOLERANCE_SECS - 1;
        let header = format!("t={},v1={}", ts, sign(payload, ts, SECRET));
        assert!(verify_signature(payload, &header, SECRET, now()).is_err());
    }

    #[test]
    fn second_v1_signature_can_match() {
        // Stripe sends multiple v1 entries during secret rotation.
        let payload = br#"{}"#;
        let ts = now().timestamp();
        let header = format!(
            "t={},v1={},v1={}",
            ts,
            sign(payload, ts, "whsec_retired"),
            sign(payload, ts, SECRET),
        );
        assert!(verify_signature(payload, &header, SECRET, now()).is_ok());
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let err = verify_signature(b"{}", "v1=abcdef", SECRET, now()).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn webhook_event_parses_nested_object() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "type": "checkout.session.completed",
                "data": {"object": {"subscription": "sub_123", "metadata": {"userId": "user-1"}}}
            }"#,
        )
        .expect("event json");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(
            event.data.object.pointer("/metadata/userId").and_then(Value::as_str),
            Some("user-1")
        );
    }
}
