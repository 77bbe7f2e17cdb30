use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Category, CategoryType, Feedback, Role, User, UserCard};
use super::store::{CatalogStore, FeedbackStore, LedgerStore, Store, UserStore};
use crate::ledger::{BudgetDocument, BudgetEntry, LedgerChange};

/// PostgreSQL-backed store. Budgets are one row per user with the entries
/// kept as a JSONB document.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique-constraint violation into `Duplicate`, pass everything else through
fn unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Duplicate(what()),
        _ => DatabaseError::Sqlx(err),
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DatabaseError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse::<Role>().map_err(DatabaseError::QueryError)?,
        created_at: row.try_get("created_at")?,
    })
}

fn kind_from_row(row: &PgRow) -> Result<CategoryType, DatabaseError> {
    let kind: String = row.try_get("type")?;
    kind.parse::<CategoryType>().map_err(DatabaseError::QueryError)
}

fn category_from_row(row: &PgRow) -> Result<Category, DatabaseError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: kind_from_row(row)?,
        image: row.try_get("image")?,
    })
}

fn card_from_row(row: &PgRow) -> Result<UserCard, DatabaseError> {
    Ok(UserCard {
        id: row.try_get("id")?,
        owner_user_id: row.try_get("owner_user_id")?,
        name: row.try_get("name")?,
        kind: kind_from_row(row)?,
        image: row.try_get("image")?,
    })
}

fn feedback_from_row(row: &PgRow) -> Result<Feedback, DatabaseError> {
    Ok(Feedback {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        message: row.try_get("message")?,
        rating: row.try_get("rating")?,
        created_at: row.try_get("created_at")?,
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || "username or email is already registered".to_string()))?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row = sqlx::query(&query).bind(username).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, role = $5 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || "username or email is already registered".to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_category(&self, category: Category) -> Result<Category, DatabaseError> {
        sqlx::query("INSERT INTO categories (id, name, type, image) VALUES ($1, $2, $3, $4)")
            .bind(category.id)
            .bind(&category.name)
            .bind(category.kind.as_str())
            .bind(&category.image)
            .execute(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let rows = sqlx::query("SELECT id, name, type, image FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DatabaseError> {
        let row = sqlx::query("SELECT id, name, type, image FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn update_category(&self, category: &Category) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE categories SET name = $2, type = $3, image = $4 WHERE id = $1")
            .bind(category.id)
            .bind(&category.name)
            .bind(category.kind.as_str())
            .bind(&category.image)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("category {}", category.id)));
        }
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_card(&self, card: UserCard) -> Result<UserCard, DatabaseError> {
        sqlx::query("INSERT INTO user_cards (id, owner_user_id, name, type, image) VALUES ($1, $2, $3, $4, $5)")
            .bind(card.id)
            .bind(card.owner_user_id)
            .bind(&card.name)
            .bind(card.kind.as_str())
            .bind(&card.image)
            .execute(&self.pool)
            .await
            .map_err(|e| unique_violation(e, || format!("a card named '{}' already exists", card.name)))?;
        Ok(card)
    }

    async fn list_cards(&self, owner: Uuid) -> Result<Vec<UserCard>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, owner_user_id, name, type, image FROM user_cards WHERE owner_user_id = $1 ORDER BY name",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn find_card(&self, owner: Uuid, id: Uuid) -> Result<Option<UserCard>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, owner_user_id, name, type, image FROM user_cards WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(card_from_row).transpose()
    }

    async fn update_card(&self, card: &UserCard) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE user_cards SET name = $3, type = $4, image = $5 WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(card.id)
        .bind(card.owner_user_id)
        .bind(&card.name)
        .bind(card.kind.as_str())
        .bind(&card.image)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("a card named '{}' already exists", card.name)))?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("card {}", card.id)));
        }
        Ok(())
    }

    async fn delete_card(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM user_cards WHERE id = $1 AND owner_user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn find_budget(&self, owner: Uuid) -> Result<Option<BudgetDocument>, DatabaseError> {
        let row = sqlx::query("SELECT entries FROM budgets WHERE owner_user_id = $1")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(entries): Json<Vec<BudgetEntry>> = row.try_get("entries")?;
                Ok(Some(BudgetDocument { owner_user_id: owner, entries }))
            }
            None => Ok(None),
        }
    }

    async fn apply_budget_change(&self, owner: Uuid, change: LedgerChange) -> Result<BudgetDocument, DatabaseError> {
        // The row lock taken by FOR UPDATE serializes every change to this
        // user's budget until commit. Returning early drops `tx`, which rolls back.
        let mut tx = self.pool.begin().await?;

        if change.creates_document() {
            sqlx::query(
                "INSERT INTO budgets (owner_user_id, entries) VALUES ($1, '[]'::jsonb) ON CONFLICT (owner_user_id) DO NOTHING",
            )
            .bind(owner)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query("SELECT entries FROM budgets WHERE owner_user_id = $1 FOR UPDATE")
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;

        let mut doc = match row {
            Some(row) => {
                let Json(entries): Json<Vec<BudgetEntry>> = row.try_get("entries")?;
                BudgetDocument { owner_user_id: owner, entries }
            }
            None => BudgetDocument::empty(owner),
        };

        doc.apply(change)?;

        sqlx::query("UPDATE budgets SET entries = $2, updated_at = now() WHERE owner_user_id = $1")
            .bind(owner)
            .bind(Json(&doc.entries))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(doc)
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn insert_feedback(&self, feedback: Feedback) -> Result<Feedback, DatabaseError> {
        sqlx::query(
            "INSERT INTO feedback (id, user_id, username, message, rating, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(&feedback.username)
        .bind(&feedback.message)
        .bind(feedback.rating)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;
        Ok(feedback)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT id, user_id, username, message, rating, created_at FROM feedback ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(feedback_from_row).collect()
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
