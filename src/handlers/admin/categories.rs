// handlers/admin/categories.rs - Global category management

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::ApiPath;
use crate::database::models::Category;
use crate::error::ApiError;
use crate::services::catalog_service::{CatalogService, CategoryDraft, ImageUpload};
use crate::state::AppState;

/// Collect `name`, `type` and `image` parts. An empty file part counts as no image.
async fn read_category_form(mut multipart: Multipart) -> Result<CategoryDraft, ApiError> {
    let mut draft = CategoryDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = Some(field.text().await?),
            "type" => draft.kind = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    draft.image = Some(ImageUpload { file_name, bytes });
                }
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(draft)
}

/**
 * POST /api/category - Create a global category (multipart/form-data)
 *
 * Expected Input:
 * ```text
 * name=Food
 * type=Expenses
 * image=@food.png
 * ```
 *
 * Expected Output (Success):
 * ```json
 * { "id": "uuid", "name": "Food", "type": "Expenses", "image": "/uploads/<sha256>.png" }
 * ```
 */
pub async fn post(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Category>, ApiError> {
    let draft = read_category_form(multipart?).await?;
    let category = CatalogService::from_state(&state).create_category(draft).await?;
    Ok(Json(category))
}

/// PUT /api/updatecategory/:id - Replace any of name, type or image
pub async fn put(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Category>, ApiError> {
    let draft = read_category_form(multipart?).await?;
    let category = CatalogService::from_state(&state).update_category(id, draft).await?;
    Ok(Json(category))
}

/// DELETE /api/deletecategory/:id
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    CatalogService::from_state(&state).delete_category(id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}
