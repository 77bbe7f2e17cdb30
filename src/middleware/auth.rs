use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers(), &state.config.security.auth_header).map_err(|msg| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.username, auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Pull the bearer token from the configured header, falling back to `Authorization`
fn extract_jwt_from_headers(headers: &HeaderMap, header_name: &str) -> Result<String, String> {
    let auth_header = headers
        .get(header_name)
        .or_else(|| headers.get(AUTHORIZATION))
        .ok_or_else(|| format!("Missing {} header", header_name))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid authentication header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authentication header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_custom_header_first() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("Bearer custom"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer standard"));
        assert_eq!(extract_jwt_from_headers(&headers, "x-auth-token").unwrap(), "custom");
    }

    #[test]
    fn falls_back_to_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer standard"));
        assert_eq!(extract_jwt_from_headers(&headers, "x-auth-token").unwrap(), "standard");
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        let headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers, "x-auth-token").is_err());

        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("Token abc"));
        assert!(extract_jwt_from_headers(&headers, "x-auth-token").is_err());

        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers, "x-auth-token").is_err());
    }
}
