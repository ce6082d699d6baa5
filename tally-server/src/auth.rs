use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::AppState;

/// Shared-secret guard for the protected endpoints. A missing server secret
/// is a deployment fault, not a client fault.
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.api_key.as_deref() else {
            return Err(ApiError::misconfigured("API_KEY is not configured"));
        };
        match parts.headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
            Some(provided) if provided == expected => Ok(RequireApiKey),
            _ => Err(ApiError::unauthorized()),
        }
    }
}
