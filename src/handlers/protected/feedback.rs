// handlers/protected/feedback.rs - POST /api/fedback

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::Deserialize;

use crate::api::ApiJson;
use crate::database::models::Feedback;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::feedback_service::FeedbackService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub message: String,
    pub rating: Option<i16>,
}

/// POST /api/fedback - Leave a message for the admins, optionally rated 1-5
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<FeedbackRequest>,
) -> Result<Json<Feedback>, ApiError> {
    let feedback = FeedbackService::new(state.store.clone())
        .submit(&auth_user, &payload.message, payload.rating)
        .await?;
    Ok(Json(feedback))
}
