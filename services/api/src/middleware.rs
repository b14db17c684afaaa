//! Token authentication middleware and caller extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use tracing::warn;

use crate::{error::ApiError, models::user::User, state::AppState};

/// Scheme prefix expected in the Authorization header
const TOKEN_SCHEME: &str = "Token ";

/// Extract the token key from an Authorization header value
///
/// None when the header uses a different scheme; such requests proceed
/// anonymously.
pub fn parse_token_header(value: &str) -> Option<&str> {
    value
        .strip_prefix(TOKEN_SCHEME)
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Authentication middleware
///
/// Resolves a presented token to its user and stashes the user in the
/// request extensions. A token that does not resolve is rejected here;
/// requests without one pass through anonymously, and each handler
/// decides whether it requires a caller.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    if let Some(key) = header_value.and_then(parse_token_header) {
        let user = state.tokens.resolve(key).await?.ok_or_else(|| {
            warn!("Rejected request with unknown token");
            ApiError::Unauthorized
        })?;

        req.extensions_mut().insert(user);
    }

    let response = next.run(req).await;

    Ok(response)
}

/// Extractor for handlers that require an authenticated caller
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extractor for handlers that serve anonymous callers too
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<User>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_header() {
        assert_eq!(parse_token_header("Token abc123"), Some("abc123"));
        assert_eq!(parse_token_header("Token "), None);
        assert_eq!(parse_token_header("Bearer abc123"), None);
        assert_eq!(parse_token_header("token abc123"), None);
    }
}
