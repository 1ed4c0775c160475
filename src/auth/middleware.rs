//! Authentication Middleware
//! Mission: Gate protected routes and hand the caller identity to handlers
//!
//! On success the middleware inserts exactly one `AuthUser` into the request
//! extensions. Handlers take it through the `AuthUser` extractor.

use crate::auth::{jwt::JwtHandler, models::AuthUser};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;

    let claims = jwt_handler.validate_token(token).map_err(|e| {
        warn!(path = %req.uri().path(), reason = %e, "Rejected bearer token");
        AuthError::InvalidToken
    })?;

    let identity = claims.identity();
    debug!(user_id = %identity.user_id, "Authenticated request");

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Token from the `Authorization` header with any `Bearer ` prefix removed
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingIdentity)
    }
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    /// Handler mounted without the middleware in front of it
    MissingIdentity,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Authorization header missing",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::MissingIdentity => "Unauthorized",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}
