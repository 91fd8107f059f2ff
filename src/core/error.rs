use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::PlanType;

/// Service-level error taxonomy. Handlers map each kind to an HTTP status in
/// `api::error`, so classification never depends on message contents.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid client details")]
    Validation(Vec<String>),

    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    #[error("Rate limit exceeded")]
    QuotaExceeded {
        reset_time: DateTime<Utc>,
        plan: PlanType,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        ServiceError::Upstream {
            service,
            message: err.to_string(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
