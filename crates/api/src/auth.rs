use crate::error::ApiError;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use loanmatch_core::auth::AuthUser;

/// Extractor for authenticated routes. Rejects with 401 unless the request
/// carries a bearer token the auth provider accepts.
pub struct CurrentUser(pub AuthUser);

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Some(verifier) = &state.auth else {
            return Err(ApiError::config("Auth provider is not configured"));
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(ApiError::unauthorized)?;

        match verifier.verify(token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(ApiError::unauthorized()),
            Err(err) => Err(ApiError::upstream(err, "Failed to verify session")),
        }
    }
}
