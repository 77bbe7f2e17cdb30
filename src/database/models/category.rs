use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Whether money booked against a category comes in or goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryType {
    Revenues,
    Expenses,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Revenues => "Revenues",
            CategoryType::Expenses => "Expenses",
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Revenues" | "revenues" => Ok(CategoryType::Revenues),
            "Expenses" | "expenses" => Ok(CategoryType::Expenses),
            other => Err(format!("Unknown category type '{}', expected Revenues or Expenses", other)),
        }
    }
}

/// Admin-managed category shared by every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    /// Server-relative URL of the uploaded image, e.g. `/uploads/ab12....png`.
    pub image: String,
}
