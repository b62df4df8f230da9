//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use camptime_core::domain::Identity;
use camptime_core::ports::PortError;
use std::sync::Arc;

use crate::error::http_error;
use crate::web::state::AppState;

/// The tenant scope of an authenticated caller, inserted by `require_stamm`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamm(pub String);

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that validates the bearer token and resolves the caller.
///
/// If valid, inserts the `Identity` into request extensions for handlers to use.
/// If invalid, expired or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let token = bearer_token(req.headers())
        .map(str::to_owned)
        .ok_or((StatusCode::UNAUTHORIZED, "No token provided".to_string()))?;

    let identity = state
        .db
        .identity_for_token(&token)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            other => http_error("validate token")(other),
        })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Rejects callers whose account has not been assigned to a stamm yet.
/// Must run after `require_auth`.
pub async fn require_stamm(mut req: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let stamm = stamm_of(req.extensions().get::<Identity>()).ok_or((
        StatusCode::FORBIDDEN,
        "No stamm assigned. Please contact administrator.".to_string(),
    ))?;
    req.extensions_mut().insert(Stamm(stamm));
    Ok(next.run(req).await)
}

fn stamm_of(identity: Option<&Identity>) -> Option<String> {
    identity
        .and_then(|i| i.stamm.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers_with("Bearer abc123")), Some("abc123"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_rejected() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
    }

    #[test]
    fn blank_stamm_counts_as_unassigned() {
        let mut identity = Identity {
            user_id: Uuid::new_v4(),
            stamm: None,
        };
        assert_eq!(stamm_of(Some(&identity)), None);
        identity.stamm = Some("  ".into());
        assert_eq!(stamm_of(Some(&identity)), None);
        identity.stamm = Some("Stamm Greif".into());
        assert_eq!(stamm_of(Some(&identity)), Some("Stamm Greif".into()));
        assert_eq!(stamm_of(None), None);
    }
}
