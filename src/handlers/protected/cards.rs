// handlers/protected/cards.rs - The caller's private categories

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath};
use crate::database::models::UserCard;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::catalog_service::{CardDraft, CatalogService};
use crate::state::AppState;

/**
 * POST /api/usercard - Create a card owned by the caller
 *
 * Expected Input:
 * ```json
 * { "name": "Side gig", "type": "Revenues", "image": "data:image/png;base64,iVBOR..." }
 * ```
 *
 * Card names are unique per owner; a clash is a 400 CONFLICT.
 */
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CardDraft>,
) -> Result<Json<UserCard>, ApiError> {
    let card = CatalogService::from_state(&state)
        .create_card(auth_user.user_id, payload)
        .await?;
    Ok(Json(card))
}

/// GET /api/usercards - The caller's cards, sorted by name
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<UserCard>>, ApiError> {
    let cards = CatalogService::from_state(&state).list_cards(auth_user.user_id).await?;
    Ok(Json(cards))
}

/// PUT /api/usercard/:id - Change name, type or image. Someone else's card is a 404.
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CardDraft>,
) -> Result<Json<UserCard>, ApiError> {
    let card = CatalogService::from_state(&state)
        .update_card(auth_user.user_id, id, payload)
        .await?;
    Ok(Json(card))
}

/// DELETE /api/usercard/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    CatalogService::from_state(&state)
        .delete_card(auth_user.user_id, id)
        .await?;
    Ok(Json(json!({ "message": "Card deleted" })))
}
