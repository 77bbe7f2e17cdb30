// handlers/protected/categories.rs - GET /api/getcategories

use axum::{extract::State, response::Json};

use crate::database::models::Category;
use crate::error::ApiError;
use crate::services::catalog_service::CatalogService;
use crate::state::AppState;

/// GET /api/getcategories - All global categories, sorted by name
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CatalogService::from_state(&state).list_categories().await?;
    Ok(Json(categories))
}
