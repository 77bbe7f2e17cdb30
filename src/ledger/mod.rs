// Budget ledger domain: references, day-bucketing and the per-user budget document.
//
// Nothing in here touches storage. Stores load a BudgetDocument, apply a
// LedgerChange under their own lock, and persist the whole document back.

pub mod day;
pub mod document;
pub mod summary;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use day::parse_day;
pub use document::{BudgetDocument, BudgetEntry, LedgerChange};
pub use summary::{summarize, BudgetSummary, ResolvedLabel};

/// What a budget entry is booked against: a global category or one of the
/// owner's custom cards. Exactly one, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Reference {
    Category(Uuid),
    UserCard(Uuid),
}

impl Reference {
    /// Build a reference from the two nullable wire fields.
    pub fn from_parts(category: Option<Uuid>, user_card: Option<Uuid>) -> Result<Self, LedgerError> {
        match (category, user_card) {
            (Some(id), None) => Ok(Reference::Category(id)),
            (None, Some(id)) => Ok(Reference::UserCard(id)),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousReference),
            (None, None) => Err(LedgerError::MissingReference),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Reference::Category(id) | Reference::UserCard(id) => *id,
        }
    }

    /// Human label used in error messages ("category" or "card").
    pub fn kind_label(&self) -> &'static str {
        match self {
            Reference::Category(_) => "category",
            Reference::UserCard(_) => "card",
        }
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match self {
            Reference::Category(id) => Some(*id),
            Reference::UserCard(_) => None,
        }
    }

    pub fn user_card_id(&self) -> Option<Uuid> {
        match self {
            Reference::UserCard(id) => Some(*id),
            Reference::Category(_) => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind_label(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Either CategoriesId or UserCardId is required")]
    MissingReference,

    #[error("Provide only one of CategoriesId or UserCardId, not both")]
    AmbiguousReference,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("A budget entry for this {} already exists on {day}", .reference.kind_label())]
    Duplicate { reference: Reference, day: chrono::NaiveDate },

    #[error("No budget entry for this {} on {day}", .reference.kind_label())]
    NotFound { reference: Reference, day: chrono::NaiveDate },

    #[error("Budget totals exceed the supported range")]
    Overflow,
}

/// Largest amount a single entry may carry. Keeps every total well inside `Decimal`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Amounts on new entries must be strictly positive.
pub fn validate_new_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("{} must be greater than zero", amount)));
    }
    check_ceiling(amount)
}

/// Updates may zero an entry out but never make it negative.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("{} must not be negative", amount)));
    }
    check_ceiling(amount)
}

fn check_ceiling(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount > MAX_AMOUNT {
        return Err(LedgerError::InvalidAmount(format!("{} exceeds the limit of {}", amount, MAX_AMOUNT)));
    }
    Ok(amount)
}
