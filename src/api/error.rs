use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::{json, Value};
use std::fmt;

use crate::core::ServiceError;

/// HTTP-facing error: a status code plus the JSON body the client sees.
/// Built from `ServiceError` kinds, so status mapping is structural rather
/// than inferred from message text.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        ApiError { status, body }
    }

    pub fn message(message: impl Into<String>, status: StatusCode) -> Self {
        ApiError {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::message(message, StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::message(message, StatusCode::NOT_FOUND)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::message(message, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body.get("error").and_then(Value::as_str) {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "{}", self.body),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(&self.body)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(details) => ApiError::new(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid client details", "details": details }),
            ),
            ServiceError::UnsupportedDocumentType(document_type) => ApiError::bad_request(format!(
                "Unsupported document type: {}",
                document_type
            )),
            ServiceError::QuotaExceeded { reset_time, plan } => ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Rate limit exceeded",
                    "message": "You have reached your plan limit. Upgrade to Pro for unlimited document generation.",
                    "resetTime": reset_time.to_rfc3339(),
                    "planType": plan.to_string(),
                }),
            ),
            ServiceError::Unauthorized => {
                ApiError::message("Unauthorized", StatusCode::UNAUTHORIZED)
            }
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::BadRequest(message) => ApiError::bad_request(message),
            ServiceError::Upstream { service, message } => {
                tracing::error!(service, %message, "upstream request failed");
                ApiError::internal_server_error(format!("{} request failed: {}", service, message))
            }
            ServiceError::Config(message) => {
                tracing::error!(%message, "configuration error");
                ApiError::internal_server_error(format!("Configuration error: {}", message))
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanType;
    use chrono::Utc;

    #[test]
    fn validation_maps_to_400_with_details() {
        let err: ApiError =
            ServiceError::Validation(vec!["Missing required field: abn".to_string()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body["error"], "Invalid client details");
        assert_eq!(err.body["details"][0], "Missing required field: abn");
    }

    #[test]
    fn quota_maps_to_429_with_upgrade_message() {
        let err: ApiError = ServiceError::QuotaExceeded {
            reset_time: Utc::now(),
            plan: PlanType::Starter,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.body["error"], "Rate limit exceeded");
        assert_eq!(err.body["planType"], "starter");
    }

    #[test]
    fn upstream_maps_to_500() {
        let err: ApiError = ServiceError::upstream("openai", "boom").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err: ApiError = ServiceError::Unauthorized.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
