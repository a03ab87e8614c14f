//! Bearer token extractor for `/api/sync/*`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use super::constant_time_compare;
use crate::state::AppState;

/// Extractor that requires `Authorization: Bearer <SYNC_API_TOKEN>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireApiToken) -> impl IntoResponse {
///     "ok"
/// }
/// ```
pub struct RequireApiToken;

/// Rejection for a missing or wrong API token.
pub struct ApiTokenRejection;

impl IntoResponse for ApiTokenRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            "Unauthorized",
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireApiToken {
    type Rejection = ApiTokenRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiTokenRejection)?;

        if constant_time_compare(provided.trim(), state.config().api_token.expose_secret()) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected API token");
            Err(ApiTokenRejection)
        }
    }
}
