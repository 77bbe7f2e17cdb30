// handlers/protected/budget.rs - Budget ledger endpoints
//
// Every operation is scoped to the caller. The user id never comes from the body.

use axum::{
    extract::{Extension, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, ApiQuery, BudgetView};
use crate::error::ApiError;
use crate::ledger::{BudgetSummary, Reference};
use crate::middleware::AuthUser;
use crate::services::ledger_service::LedgerService;
use crate::state::AppState;

/// Body shared by add, update and delete. Exactly one of `CategoriesId` and
/// `UserCardId` must be set; empty strings count as unset.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetEntryRequest {
    #[serde(rename = "CategoriesId", default)]
    pub category: Option<String>,
    #[serde(rename = "UserCardId", default)]
    pub user_card: Option<String>,
    #[serde(rename = "valueitem", default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<String>,
}

impl BudgetEntryRequest {
    fn reference(&self) -> Result<Reference, ApiError> {
        let category = parse_id("CategoriesId", self.category.as_deref())?;
        let user_card = parse_id("UserCardId", self.user_card.as_deref())?;
        Ok(Reference::from_parts(category, user_card)?)
    }

    fn amount(&self) -> Result<Decimal, ApiError> {
        self.amount.ok_or_else(|| ApiError::field("valueitem", "valueitem is required"))
    }

    fn date(&self) -> Result<&str, ApiError> {
        self.date
            .as_deref()
            .ok_or_else(|| ApiError::field("date", "date is required"))
    }
}

fn parse_id(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| ApiError::field(field, format!("'{}' is not a valid id", raw))),
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/getUserBudget - The caller's entries with references resolved
///
/// Expected Output (Success):
/// ```json
/// {
///   "userId": "uuid",
///   "products": [
///     { "CategoriesId": { "id": "...", "name": "Food", "type": "Expenses", "image": "/uploads/..." },
///       "UserCardId": null, "valueitem": 40, "date": "2024-01-05" }
///   ]
/// }
/// ```
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<BudgetView>, ApiError> {
    let view = LedgerService::new(state.store.clone()).budget(auth_user.user_id).await?;
    Ok(Json(view))
}

/**
 * POST /api/addBudget - Book an amount against a category or card for a day
 *
 * Expected Input:
 * ```json
 * { "CategoriesId": "uuid", "valueitem": 40, "date": "2024-01-05T23:59:00Z" }
 * ```
 *
 * The date is bucketed to its calendar day. A second entry for the same
 * reference on the same day is rejected with 400 CONFLICT.
 */
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<BudgetEntryRequest>,
) -> Result<Json<BudgetView>, ApiError> {
    let view = LedgerService::new(state.store.clone())
        .add(auth_user.user_id, payload.reference()?, payload.amount()?, payload.date()?)
        .await?;
    Ok(Json(view))
}

/// PUT /api/updateBudget - Overwrite the amount of an existing entry
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<BudgetEntryRequest>,
) -> Result<Json<BudgetView>, ApiError> {
    let view = LedgerService::new(state.store.clone())
        .update(auth_user.user_id, payload.reference()?, payload.amount()?, payload.date()?)
        .await?;
    Ok(Json(view))
}

/// DELETE /api/deleteBudget - Remove the entry for a reference and day
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<BudgetEntryRequest>,
) -> Result<Json<BudgetView>, ApiError> {
    let view = LedgerService::new(state.store.clone())
        .remove(auth_user.user_id, payload.reference()?, payload.date()?)
        .await?;
    Ok(Json(view))
}

/// GET /api/budgetSummary?from=YYYY-MM-DD&to=YYYY-MM-DD - Chart totals
pub async fn summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<BudgetSummary>, ApiError> {
    let summary = LedgerService::new(state.store.clone())
        .summary(auth_user.user_id, query.from.as_deref(), query.to.as_deref())
        .await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(category: Option<&str>, user_card: Option<&str>) -> BudgetEntryRequest {
        BudgetEntryRequest {
            category: category.map(String::from),
            user_card: user_card.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn empty_string_ids_count_as_unset() {
        let id = Uuid::new_v4().to_string();
        let reference = request(Some(&id), Some("")).reference().unwrap();
        assert!(matches!(reference, Reference::Category(_)));

        assert!(request(Some(""), Some("  ")).reference().is_err());
    }

    #[test]
    fn both_ids_are_rejected() {
        let a = Uuid::new_v4().to_string();
        let b = Uuid::new_v4().to_string();
        assert!(request(Some(&a), Some(&b)).reference().is_err());
    }

    #[test]
    fn malformed_id_names_the_field() {
        let err = request(Some("food"), None).reference().unwrap_err();
        assert!(err.to_json()["field_errors"]["CategoriesId"].is_string());
    }

    #[test]
    fn amount_accepts_numbers() {
        let body: BudgetEntryRequest =
            serde_json::from_str(r#"{"UserCardId": null, "CategoriesId": "x", "valueitem": 12.5, "date": "2024-01-05"}"#)
                .unwrap();
        assert_eq!(body.amount().unwrap(), Decimal::new(125, 1));
    }
}
