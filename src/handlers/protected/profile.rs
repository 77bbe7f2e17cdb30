// handlers/protected/profile.rs - PUT /api/users/profile

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::Deserialize;

use crate::api::ApiJson;
use crate::database::models::UserSummary;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::user_service::{ProfileUpdate, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/**
 * PUT /api/users/profile - Change the caller's username, email or password
 *
 * Expected Input (all optional):
 * ```json
 * { "username": "alice2", "email": "new@x.com", "password": "NewPass123" }
 * ```
 *
 * Same validation as signup. Existing tokens stay valid.
 */
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ProfileRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let update = ProfileUpdate {
        username: payload.username,
        email: payload.email,
        password: payload.password,
    };
    let user = UserService::new(state.store.clone())
        .update_profile(auth_user.user_id, update)
        .await?;
    Ok(Json(UserSummary::from(&user)))
}
