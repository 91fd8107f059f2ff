use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::billing::webhook::{handle_event, verify_signature, WebhookEvent};
use crate::billing::CheckoutSession;
use crate::core::{ServiceError, ServiceResult};
use crate::models::AuthUser;

use super::error::ApiResult;
use super::state::ApiState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub price_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortalSessionRequest {
    pub token: Option<String>,
}

/// Start a subscription checkout for the authenticated user, creating the
/// Stripe customer on first purchase.
pub async fn create_checkout_session(
    body: web::Json<CheckoutSessionRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(price_id), Some(token)) = (body.price_id, body.token) else {
        return Ok(HttpResponse::BadRequest().body("Missing priceId or token"));
    };

    let user = match state.supabase.get_user(&token).await {
        Ok(user) => user,
        Err(_) => return Ok(HttpResponse::Unauthorized().body("Unauthorized")),
    };

    match checkout_session_for(&state, &user, &price_id).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({ "sessionId": session.id }))),
        Err(err) => {
            tracing::error!(error = %err, "failed to create checkout session");
            Ok(HttpResponse::InternalServerError().body("Internal Server Error"))
        }
    }
}

async fn checkout_session_for(
    state: &ApiState,
    user: &AuthUser,
    price_id: &str,
) -> ServiceResult<CheckoutSession> {
    let profile = state.supabase.get_profile(&user.id).await?;

    let customer_id = match profile.stripe_customer_id {
        Some(id) => id,
        None => {
            let customer = state
                .stripe
                .create_customer(user.email.as_deref(), &user.id)
                .await?;
            state
                .supabase
                .update_profile(&user.id, &json!({ "stripe_customer_id": customer.id }))
                .await?;
            customer.id
        }
    };

    let success_url = format!(
        "{}/dashboard?session_id={{CHECKOUT_SESSION_ID}}",
        state.config.app_url
    );
    let cancel_url = format!("{}/dashboard", state.config.app_url);
    state
        .stripe
        .create_checkout_session(&customer_id, price_id, &user.id, &success_url, &cancel_url)
        .await
}

/// Open a Stripe billing-portal session for an existing customer.
pub async fn create_portal_session(
    body: web::Json<PortalSessionRequest>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let Some(token) = body.into_inner().token else {
        return Ok(HttpResponse::BadRequest().body("Missing token"));
    };

    let user = match state.supabase.get_user(&token).await {
        Ok(user) => user,
        Err(_) => return Ok(HttpResponse::Unauthorized().body("Unauthorized")),
    };

    let profile = match state.supabase.get_profile(&user.id).await {
        Ok(profile) => profile,
        Err(ServiceError::NotFound(_)) => {
            return Ok(HttpResponse::NotFound().body("Customer not found"));
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load profile");
            return Ok(HttpResponse::InternalServerError().body("Internal Server Error"));
        }
    };
    let Some(customer_id) = profile.stripe_customer_id else {
        return Ok(HttpResponse::NotFound().body("Customer not found"));
    };

    let return_url = format!("{}/dashboard", state.config.app_url);
    match state
        .stripe
        .create_portal_session(&customer_id, &return_url)
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({ "url": session.url }))),
        Err(err) => {
            tracing::error!(error = %err, "failed to create portal session");
            Ok(HttpResponse::InternalServerError().body("Internal Server Error"))
        }
    }
}

/// Signature-verified Stripe event intake. The raw body is required for
/// verification, so this handler takes `web::Bytes` rather than JSON.
pub async fn webhook(
    req: HttpRequest,
    payload: web::Bytes,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result: ServiceResult<()> = async {
        verify_signature(
            &payload,
            &signature,
            &state.config.stripe_webhook_secret,
            Utc::now(),
        )?;
        let event: WebhookEvent = serde_json::from_slice(&payload)
            .map_err(|e| ServiceError::BadRequest(format!("invalid webhook payload: {}", e)))?;
        handle_event(event, &state.stripe, &state.supabase).await
    }
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "received": true }))),
        Err(err) => {
            tracing::error!(error = %err, "webhook processing failed");
            Ok(HttpResponse::BadRequest().body(format!("Webhook Error: {}", err)))
        }
    }
}
