use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::views::{BudgetView, ProductView};
use crate::database::models::{Category, UserCard};
use crate::database::Store;
use crate::error::ApiError;
use crate::ledger::{parse_day, summarize, BudgetDocument, BudgetEntry, BudgetSummary, LedgerChange, Reference, ResolvedLabel};

/// Snapshot of everything a user's entries can point at
struct Lookup {
    categories: HashMap<Uuid, Category>,
    cards: HashMap<Uuid, UserCard>,
}

impl Lookup {
    fn category(&self, reference: &Reference) -> Option<&Category> {
        reference.category_id().and_then(|id| self.categories.get(&id))
    }

    fn card(&self, reference: &Reference) -> Option<&UserCard> {
        reference.user_card_id().and_then(|id| self.cards.get(&id))
    }

    fn label(&self, reference: &Reference) -> Option<ResolvedLabel> {
        match reference {
            Reference::Category(_) => self.category(reference).map(|c| ResolvedLabel {
                name: c.name.clone(),
                kind: c.kind,
            }),
            Reference::UserCard(_) => self.card(reference).map(|c| ResolvedLabel {
                name: c.name.clone(),
                kind: c.kind,
            }),
        }
    }

    fn view(&self, doc: &BudgetDocument) -> BudgetView {
        let products = doc
            .entries
            .iter()
            .map(|entry| ProductView {
                category: self.category(&entry.reference).cloned(),
                user_card: self.card(&entry.reference).cloned(),
                amount: entry.amount,
                date: entry.date,
            })
            .collect();

        BudgetView {
            user_id: doc.owner_user_id,
            products,
        }
    }
}

/// Budget ledger operations, always scoped to one owner
pub struct LedgerService {
    store: Arc<dyn Store>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The owner's entries with references resolved. No document yet reads as empty.
    pub async fn budget(&self, owner: Uuid) -> Result<BudgetView, ApiError> {
        match self.store.find_budget(owner).await? {
            Some(doc) => Ok(self.lookup(owner).await?.view(&doc)),
            None => Ok(BudgetView::empty(owner)),
        }
    }

    pub async fn add(&self, owner: Uuid, reference: Reference, amount: Decimal, date: &str) -> Result<BudgetView, ApiError> {
        let day = parse_day(date)?;
        let entry = BudgetEntry::new(reference, amount, day)?;
        self.ensure_reference_exists(owner, &reference).await?;

        let doc = self.store.apply_budget_change(owner, LedgerChange::Add(entry)).await?;
        tracing::debug!("Added {} on {} for user {}", reference, day, owner);
        Ok(self.lookup(owner).await?.view(&doc))
    }

    pub async fn update(&self, owner: Uuid, reference: Reference, amount: Decimal, date: &str) -> Result<BudgetView, ApiError> {
        let day = parse_day(date)?;
        let change = LedgerChange::SetAmount {
            reference,
            date: day,
            amount,
        };

        let doc = self.store.apply_budget_change(owner, change).await?;
        tracing::debug!("Set {} on {} to {} for user {}", reference, day, amount, owner);
        Ok(self.lookup(owner).await?.view(&doc))
    }

    pub async fn remove(&self, owner: Uuid, reference: Reference, date: &str) -> Result<BudgetView, ApiError> {
        let day = parse_day(date)?;
        let change = LedgerChange::Remove { reference, date: day };

        let doc = self.store.apply_budget_change(owner, change).await?;
        tracing::debug!("Removed {} on {} for user {}", reference, day, owner);
        Ok(self.lookup(owner).await?.view(&doc))
    }

    /// Chart totals over an optional inclusive day range
    pub async fn summary(&self, owner: Uuid, from: Option<&str>, to: Option<&str>) -> Result<BudgetSummary, ApiError> {
        let from = from.filter(|s| !s.trim().is_empty()).map(parse_day).transpose()?;
        let to = to.filter(|s| !s.trim().is_empty()).map(parse_day).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ApiError::field("from", "'from' must not be after 'to'"));
            }
        }

        let doc = self
            .store
            .find_budget(owner)
            .await?
            .unwrap_or_else(|| BudgetDocument::empty(owner));
        let lookup = self.lookup(owner).await?;
        Ok(summarize(&doc, from, to, |reference| lookup.label(reference))?)
    }

    async fn ensure_reference_exists(&self, owner: Uuid, reference: &Reference) -> Result<(), ApiError> {
        let exists = match *reference {
            Reference::Category(id) => self.store.find_category(id).await?.is_some(),
            Reference::UserCard(id) => self.store.find_card(owner, id).await?.is_some(),
        };
        if !exists {
            let field = match reference {
                Reference::Category(_) => "CategoriesId",
                Reference::UserCard(_) => "UserCardId",
            };
            return Err(ApiError::field(field, format!("Unknown {} {}", reference.kind_label(), reference.id())));
        }
        Ok(())
    }

    async fn lookup(&self, owner: Uuid) -> Result<Lookup, ApiError> {
        let categories = self.store.list_categories().await?;
        let cards = self.store.list_cards(owner).await?;
        Ok(Lookup {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            cards: cards.into_iter().map(|c| (c.id, c)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CategoryType;
    use crate::database::{CatalogStore, MemoryStore};
    use axum::http::StatusCode;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        ledger: LedgerService,
        owner: Uuid,
        food: Category,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let food = store
            .insert_category(Category {
                id: Uuid::new_v4(),
                name: "Food".into(),
                kind: CategoryType::Expenses,
                image: "/uploads/food.png".into(),
            })
            .await
            .unwrap();
        Fixture {
            ledger: LedgerService::new(store.clone()),
            store,
            owner: Uuid::new_v4(),
            food,
        }
    }

    #[tokio::test]
    async fn empty_budget_is_not_an_error() {
        let f = fixture().await;
        let view = f.ledger.budget(f.owner).await.unwrap();
        assert_eq!(view.user_id, f.owner);
        assert!(view.products.is_empty());
    }

    #[tokio::test]
    async fn add_update_remove_round_trip() {
        let f = fixture().await;
        let food = Reference::Category(f.food.id);

        let view = f.ledger.add(f.owner, food, dec(40), "2024-01-05T23:59:00Z").await.unwrap();
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].category.as_ref().map(|c| c.id), Some(f.food.id));
        assert!(view.products[0].user_card.is_none());

        let view = f.ledger.update(f.owner, food, dec(55), "2024-01-05").await.unwrap();
        assert_eq!(view.products[0].amount, dec(55));

        let view = f.ledger.remove(f.owner, food, "2024-01-05T08:00:00").await.unwrap();
        assert!(view.products.is_empty());
    }

    #[tokio::test]
    async fn duplicate_day_is_rejected_but_next_day_is_fine() {
        let f = fixture().await;
        let food = Reference::Category(f.food.id);

        f.ledger.add(f.owner, food, dec(10), "2024-01-05").await.unwrap();
        let err = f.ledger.add(f.owner, food, dec(20), "2024-01-05T12:00:00Z").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("category"));

        let view = f.ledger.add(f.owner, food, dec(20), "2024-01-06").await.unwrap();
        assert_eq!(view.products.len(), 2);
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let f = fixture().await;

        let err = f
            .ledger
            .add(f.owner, Reference::Category(Uuid::new_v4()), dec(10), "2024-01-05")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let someone_else = Uuid::new_v4();
        let card = f
            .store
            .insert_card(UserCard {
                id: Uuid::new_v4(),
                owner_user_id: someone_else,
                name: "Gig".into(),
                kind: CategoryType::Revenues,
                image: "aGk=".into(),
            })
            .await
            .unwrap();
        let err = f
            .ledger
            .add(f.owner, Reference::UserCard(card.id), dec(10), "2024-01-05")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_entry_is_404_and_changes_nothing() {
        let f = fixture().await;
        let food = Reference::Category(f.food.id);
        f.ledger.add(f.owner, food, dec(10), "2024-01-05").await.unwrap();

        let err = f.ledger.update(f.owner, food, dec(99), "2024-01-06").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = f.ledger.remove(f.owner, food, "2024-01-06").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let view = f.ledger.budget(f.owner).await.unwrap();
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].amount, dec(10));
    }

    #[tokio::test]
    async fn deleted_category_reads_back_as_null() {
        let f = fixture().await;
        f.ledger
            .add(f.owner, Reference::Category(f.food.id), dec(10), "2024-01-05")
            .await
            .unwrap();
        f.store.delete_category(f.food.id).await.unwrap();

        let view = f.ledger.budget(f.owner).await.unwrap();
        assert!(view.products[0].category.is_none());
        assert!(view.products[0].user_card.is_none());

        let summary = f.ledger.summary(f.owner, None, None).await.unwrap();
        assert_eq!(summary.unresolved, dec(10));
        assert_eq!(summary.expenses, Decimal::ZERO);
    }

    #[tokio::test]
    async fn summary_rejects_inverted_range() {
        let f = fixture().await;
        let err = f
            .ledger
            .summary(f.owner, Some("2024-02-01"), Some("2024-01-01"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
