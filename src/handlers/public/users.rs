// handlers/public/users.rs - POST /api/users and POST /api/users/login

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::ApiJson;
use crate::database::models::UserSummary;
use crate::error::ApiError;
use crate::services::user_service::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/**
 * POST /api/users - Register a new account
 *
 * Expected Input:
 * ```json
 * { "username": "alice", "email": "a@x.com", "password": "Abc12345!" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * { "id": "uuid", "username": "alice", "email": "a@x.com", "role": "user" }
 * ```
 *
 * A taken username or email is a 400, like every other validation failure.
 */
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = UserService::new(state.store.clone())
        .signup(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok(Json(UserSummary::from(&user)))
}

/**
 * POST /api/users/login - Exchange credentials for a token
 *
 * Expected Input:
 * ```json
 * { "email": "a@x.com", "password": "Abc12345!" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * { "token": "eyJhbGciOiJIUzI1NiI..." }
 * ```
 *
 * The token goes back in the `x-auth-token` header as `Bearer <token>`.
 */
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.store.clone())
        .login(&payload.email, &payload.password)
        .await?;

    let token = state.jwt.issue(&user)?;
    tracing::info!("User '{}' logged in", user.username);
    Ok(Json(json!({ "token": token })))
}
