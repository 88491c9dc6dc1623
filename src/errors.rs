use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Request-time failures of the gateway.
///
/// "Not found" conditions of the lookups are not errors; handlers return
/// them as ordinary text results.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    #[error("unknown route: {service}/{action}")]
    UnknownRoute { service: String, action: String },
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },
    #[error("upstream error: {0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl GatewayError {
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::InvalidUri(_) => "invalid_uri",
            Self::UnknownRoute { .. } => "unknown_route",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream(_) => "upstream_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEnvelope(_) | Self::InvalidUri(_) | Self::InvalidArgument { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownRoute { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Upstream(format!("upstream request timed out: {err}"));
        }
        Self::Upstream(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let mut retry_after_secs = None;

        let (message, details) = match self {
            Self::InvalidEnvelope(message) | Self::InvalidUri(message) => (message, json!({})),
            Self::UnknownRoute { service, action } => (
                format!("no handler registered for {service}/{action}"),
                json!({ "service": service, "action": action }),
            ),
            Self::InvalidArgument { name, message } => (message, json!({ "argument": name })),
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry too early.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                retry_after_secs = Some(secs.max(1));
                (
                    "too many requests, retry later".to_string(),
                    json!({ "retry_after_secs": secs.max(1) }),
                )
            }
            Self::Upstream(message) => {
                tracing::warn!(error = %message, "upstream call failed");
                (message, json!({}))
            }
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details,
            }),
        )
            .into_response();

        if let Some(secs) = retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}
