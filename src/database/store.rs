use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Category, Feedback, User, UserCard};
use crate::ledger::{BudgetDocument, LedgerChange};

/// Credential store. Username and email are unique across all users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the username or email is taken.
    async fn insert_user(&self, user: User) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Overwrite every mutable field. `Duplicate` on a uniqueness clash,
    /// `NotFound` if the id is unknown.
    async fn update_user(&self, user: &User) -> Result<(), DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
}

/// Global categories plus per-user cards.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> Result<Category, DatabaseError>;

    /// Sorted by name.
    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DatabaseError>;

    async fn update_category(&self, category: &Category) -> Result<(), DatabaseError>;

    /// Returns whether a category was removed.
    async fn delete_category(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Fails with `Duplicate` when the owner already has a card with that name.
    async fn insert_card(&self, card: UserCard) -> Result<UserCard, DatabaseError>;

    /// The owner's cards, sorted by name.
    async fn list_cards(&self, owner: Uuid) -> Result<Vec<UserCard>, DatabaseError>;

    /// Only finds cards belonging to `owner`.
    async fn find_card(&self, owner: Uuid, id: Uuid) -> Result<Option<UserCard>, DatabaseError>;

    async fn update_card(&self, card: &UserCard) -> Result<(), DatabaseError>;

    async fn delete_card(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
}

/// One budget document per user.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_budget(&self, owner: Uuid) -> Result<Option<BudgetDocument>, DatabaseError>;

    /// Load, apply and save as one unit. Concurrent changes for the same owner
    /// are serialized, so the duplicate check in an add cannot race another
    /// add. A missing document is created only for `LedgerChange::Add`; on any
    /// error nothing is persisted.
    async fn apply_budget_change(&self, owner: Uuid, change: LedgerChange) -> Result<BudgetDocument, DatabaseError>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback, DatabaseError>;

    /// Newest first.
    async fn list_feedback(&self) -> Result<Vec<Feedback>, DatabaseError>;
}

/// Everything the API needs from persistence.
#[async_trait]
pub trait Store: UserStore + CatalogStore + LedgerStore + FeedbackStore {
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
