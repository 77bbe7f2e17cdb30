// handlers/admin/users.rs - User listing and role changes

use axum::{extract::State, response::Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath};
use crate::database::models::{Role, UserSummary};
use crate::error::ApiError;
use crate::services::user_service::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

/// GET /api/users - Every account, sorted by username
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = UserService::new(state.store.clone()).list().await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/**
 * PUT /api/users/:id/role - Promote or demote a user
 *
 * Expected Input:
 * ```json
 * { "role": "admin" }
 * ```
 */
pub async fn set_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let role: Role = payload.role.parse().map_err(|m: String| ApiError::field("role", m))?;
    let user = UserService::new(state.store.clone()).set_role(id, role).await?;
    Ok(Json(UserSummary::from(&user)))
}
