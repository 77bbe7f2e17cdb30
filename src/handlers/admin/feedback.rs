// handlers/admin/feedback.rs - GET /api/fedback

use axum::{extract::State, response::Json};

use crate::database::models::Feedback;
use crate::error::ApiError;
use crate::services::feedback_service::FeedbackService;
use crate::state::AppState;

/// GET /api/fedback - All feedback, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Feedback>>, ApiError> {
    Ok(Json(FeedbackService::new(state.store.clone()).list().await?))
}
