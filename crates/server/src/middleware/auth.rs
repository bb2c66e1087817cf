//! Bearer-token extractors for admin routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::services::Claims;
use crate::state::AppState;

/// Extractor that requires a valid admin bearer token.
///
/// Rejects with 401 when the `Authorization` header is missing, not a
/// `Bearer` token, or the token fails verification.
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(claims): RequireAdmin) -> String {
///     format!("Hello, {}!", claims.username)
/// }
/// ```
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.tokens().verify(token)?;
        set_sentry_user(claims.sub.as_i64(), &claims.username);
        tracing::Span::current().record("admin", claims.username.as_str());

        Ok(Self(claims))
    }
}

/// Extractor that requires an admin allowed to make changes.
///
/// Viewers are rejected with 403.
pub struct RequireAdminWriter(pub Claims);

impl FromRequestParts<AppState> for RequireAdminWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdmin(claims) = RequireAdmin::from_request_parts(parts, state).await?;

        if !claims.role.can_write() {
            tracing::warn!(admin = %claims.username, role = %claims.role, "write denied");
            return Err(AppError::Forbidden(
                "This account has read-only access".to_string(),
            ));
        }

        Ok(Self(claims))
    }
}
