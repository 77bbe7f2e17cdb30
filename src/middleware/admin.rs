use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that lets only administrators through. Runs after
/// `jwt_auth_middleware` and re-reads the role from the store, so a demotion
/// takes effect before the token expires.
pub async fn require_admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before admin validation"))?;

    let user = state
        .store
        .find_user(auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    if !user.is_admin() {
        tracing::warn!(
            "Admin route {} {} refused for '{}'",
            request.method(),
            request.uri().path(),
            user.username
        );
        return Err(ApiError::forbidden("Administrator access required"));
    }

    Ok(next.run(request).await)
}
