use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loanmatch_core::llm::error::ProviderExhausted;
use serde_json::json;

/// API-facing error. Every response body is `{"error": "..."}`; internal
/// detail goes to tracing/sentry, never to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Degraded mode: the database was unreachable at startup.
    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Service is temporarily unavailable".to_string(),
        }
    }

    /// Operator-fixable misconfiguration (missing secret or base URL).
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Upstream store or provider failure: capture the cause, answer with a
    /// stable public message.
    pub fn upstream(err: anyhow::Error, public_message: impl Into<String>) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        let message = public_message.into();
        tracing::error!(error = %err, %message, "upstream failure");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }

    /// Model fallback errors surface the last provider message when present.
    pub fn from_advisor(err: anyhow::Error) -> Self {
        let message = match err.downcast_ref::<ProviderExhausted>() {
            Some(exhausted) => exhausted
                .last_error
                .clone()
                .unwrap_or_else(|| "Failed to get response from the completion provider".to_string()),
            None => "Failed to process chat message".to_string(),
        };
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "advisor call failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisor_exhaustion_surfaces_last_provider_message() {
        let err: anyhow::Error = ProviderExhausted {
            models_tried: vec!["a".to_string(), "b".to_string()],
            last_error: Some("rate limited".to_string()),
        }
        .into();

        let api_err = ApiError::from_advisor(err);
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.message, "rate limited");
    }

    #[test]
    fn advisor_exhaustion_without_detail_uses_stable_message() {
        let err: anyhow::Error = ProviderExhausted {
            models_tried: vec!["a".to_string()],
            last_error: None,
        }
        .into();

        let api_err = ApiError::from_advisor(err);
        assert!(api_err.message.contains("Failed to get response"));
    }
}
