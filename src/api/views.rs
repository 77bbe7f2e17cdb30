// Wire shapes for budget responses. Field names follow what the web client
// already reads (`products`, `CategoriesId`, `UserCardId`, `valueitem`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Category, UserCard};

/// One budget entry with its reference resolved. Exactly one of
/// `category`/`user_card` is set unless the target has been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(rename = "CategoriesId")]
    pub category: Option<Category>,
    #[serde(rename = "UserCardId")]
    pub user_card: Option<UserCard>,
    #[serde(rename = "valueitem")]
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub user_id: Uuid,
    pub products: Vec<ProductView>,
}

impl BudgetView {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            products: Vec::new(),
        }
    }
}
