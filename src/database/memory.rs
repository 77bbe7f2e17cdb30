use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Category, Feedback, User, UserCard};
use super::store::{CatalogStore, FeedbackStore, LedgerStore, Store, UserStore};
use crate::ledger::{BudgetDocument, LedgerChange};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    cards: HashMap<Uuid, UserCard>,
    budgets: HashMap<Uuid, BudgetDocument>,
    feedback: Vec<Feedback>,
}

impl Collections {
    fn user_clash(&self, user: &User) -> Option<String> {
        self.users.values().filter(|other| other.id != user.id).find_map(|other| {
            if other.username == user.username {
                Some(format!("username '{}' is already taken", user.username))
            } else if other.email == user.email {
                Some(format!("email '{}' is already registered", user.email))
            } else {
                None
            }
        })
    }

    fn card_clash(&self, card: &UserCard) -> bool {
        self.cards
            .values()
            .any(|other| other.id != card.id && other.owner_user_id == card.owner_user_id && other.name == card.name)
    }
}

/// In-process store for development and tests. One lock over every
/// collection, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, DatabaseError> {
        let mut data = self.inner.write().await;
        if let Some(reason) = data.user_clash(&user) {
            return Err(DatabaseError::Duplicate(reason));
        }
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let email = email.to_lowercase();
        Ok(self.inner.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut data = self.inner.write().await;
        if !data.users.contains_key(&user.id) {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        if let Some(reason) = data.user_clash(user) {
            return Err(DatabaseError::Duplicate(reason));
        }
        data.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let mut users: Vec<User> = self.inner.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_category(&self, category: Category) -> Result<Category, DatabaseError> {
        self.inner.write().await.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let mut categories: Vec<Category> = self.inner.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DatabaseError> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }

    async fn update_category(&self, category: &Category) -> Result<(), DatabaseError> {
        let mut data = self.inner.write().await;
        match data.categories.get_mut(&category.id) {
            Some(slot) => {
                *slot = category.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("category {}", category.id))),
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.categories.remove(&id).is_some())
    }

    async fn insert_card(&self, card: UserCard) -> Result<UserCard, DatabaseError> {
        let mut data = self.inner.write().await;
        if data.card_clash(&card) {
            return Err(DatabaseError::Duplicate(format!("a card named '{}' already exists", card.name)));
        }
        data.cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn list_cards(&self, owner: Uuid) -> Result<Vec<UserCard>, DatabaseError> {
        let data = self.inner.read().await;
        let mut cards: Vec<UserCard> = data.cards.values().filter(|c| c.owner_user_id == owner).cloned().collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cards)
    }

    async fn find_card(&self, owner: Uuid, id: Uuid) -> Result<Option<UserCard>, DatabaseError> {
        let data = self.inner.read().await;
        Ok(data.cards.get(&id).filter(|c| c.owner_user_id == owner).cloned())
    }

    async fn update_card(&self, card: &UserCard) -> Result<(), DatabaseError> {
        let mut data = self.inner.write().await;
        let owned = data
            .cards
            .get(&card.id)
            .map_or(false, |existing| existing.owner_user_id == card.owner_user_id);
        if !owned {
            return Err(DatabaseError::NotFound(format!("card {}", card.id)));
        }
        if data.card_clash(card) {
            return Err(DatabaseError::Duplicate(format!("a card named '{}' already exists", card.name)));
        }
        data.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn delete_card(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut data = self.inner.write().await;
        if data.cards.get(&id).map_or(false, |c| c.owner_user_id == owner) {
            data.cards.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn find_budget(&self, owner: Uuid) -> Result<Option<BudgetDocument>, DatabaseError> {
        Ok(self.inner.read().await.budgets.get(&owner).cloned())
    }

    async fn apply_budget_change(&self, owner: Uuid, change: LedgerChange) -> Result<BudgetDocument, DatabaseError> {
        let mut data = self.inner.write().await;

        // Work on a copy so a rejected change never leaves a half-applied
        // or freshly created empty document behind.
        let mut doc = data
            .budgets
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| BudgetDocument::empty(owner));
        doc.apply(change)?;

        data.budgets.insert(owner, doc.clone());
        Ok(doc)
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback, DatabaseError> {
        self.inner.write().await.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, DatabaseError> {
        let mut all = self.inner.read().await.feedback.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
