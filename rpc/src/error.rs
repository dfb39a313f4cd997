//! RPC error types and their HTTP mapping.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use listwise_claims::{ClaimError, ErrorClass};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing or invalid X-User-Id header")]
    Unauthorized,

    #[error("moderator role required")]
    Forbidden,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error("server error: {0}")]
    Server(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Claim(e) => claim_status(e),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Server(_) => "internal",
            Self::Claim(e) => e.code(),
        }
    }
}

fn claim_status(e: &ClaimError) -> StatusCode {
    match e {
        ClaimError::InvalidInput(_)
        | ClaimError::MethodNotVerifiable
        | ClaimError::ResendUnsupported(_) => StatusCode::BAD_REQUEST,
        ClaimError::BusinessNotFound(_)
        | ClaimError::ClaimNotFound(_)
        | ClaimError::NotificationNotFound(_)
        | ClaimError::NoPendingClaim(_) => StatusCode::NOT_FOUND,
        ClaimError::AlreadyOwned(_)
        | ClaimError::DuplicatePendingClaim(_)
        | ClaimError::AlreadyDecided(_)
        | ClaimError::NotVerified(_)
        | ClaimError::AlreadyVerified(_)
        | ClaimError::ConcurrentUpdate(_) => StatusCode::CONFLICT,
        ClaimError::ResendCooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
        other => match other.class() {
            ErrorClass::Proof => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorClass::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorClass::Precondition => StatusCode::BAD_REQUEST,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = matches!(&self, Self::Claim(e) if e.is_retryable());
        let message = match &self {
            // Storage details stay in the log.
            Self::Claim(e) if e.class() == ErrorClass::Internal => {
                tracing::error!(error = %e, "internal error");
                "internal error".to_string()
            }
            Self::Server(msg) => {
                tracing::error!(error = %msg, "server error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: message,
            code: self.code(),
            retryable,
        };
        let mut response = (status, Json(body)).into_response();
        if let Self::Claim(ClaimError::ResendCooldown { retry_after_secs }) = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
