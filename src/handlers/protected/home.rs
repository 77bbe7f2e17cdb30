// handlers/protected/home.rs - GET /api/home

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::user_service::UserService;
use crate::state::AppState;

/// GET /api/home - Who the token belongs to
///
/// Expected Output (Success):
/// ```json
/// { "user": "alice", "roul": "user" }
/// ```
///
/// Read from the store rather than the claims, so a role change shows up
/// before the token is reissued. `roul` is the field name the web client reads.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.store.clone())
        .get(auth_user.user_id)
        .await
        .map_err(|_| ApiError::unauthorized("User no longer exists"))?;

    Ok(Json(json!({
        "user": user.username,
        "roul": user.role,
    })))
}
