use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::Feedback;
use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub const MAX_MESSAGE_CHARS: usize = 2000;

pub struct FeedbackService {
    store: Arc<dyn Store>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, author: &AuthUser, message: &str, rating: Option<i16>) -> Result<Feedback, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::field("message", "Message is required"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ApiError::field(
                "message",
                format!("Message must be at most {} characters", MAX_MESSAGE_CHARS),
            ));
        }
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(ApiError::field("rating", "Rating must be between 1 and 5"));
            }
        }

        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: author.user_id,
            username: author.username.clone(),
            message: message.to_string(),
            rating,
            created_at: Utc::now(),
        };
        let feedback = self.store.insert_feedback(feedback).await?;
        tracing::info!("Feedback {} from '{}'", feedback.id, feedback.username);
        Ok(feedback)
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<Feedback>, ApiError> {
        Ok(self.store.list_feedback().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn author() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
        }
    }

    #[tokio::test]
    async fn validates_message_and_rating() {
        let feedback = FeedbackService::new(Arc::new(MemoryStore::new()));
        let alice = author();

        assert!(feedback.submit(&alice, "   ", None).await.is_err());
        assert!(feedback.submit(&alice, &"x".repeat(2001), None).await.is_err());
        assert!(feedback.submit(&alice, "ok", Some(0)).await.is_err());
        assert!(feedback.submit(&alice, "ok", Some(6)).await.is_err());
        assert!(feedback.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let feedback = FeedbackService::new(Arc::new(MemoryStore::new()));
        let alice = author();

        feedback.submit(&alice, "first", Some(3)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        feedback.submit(&alice, "second", None).await.unwrap();

        let all = feedback.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message, "second");
        assert_eq!(all[1].rating, Some(3));
        assert_eq!(all[1].username, "alice");
    }
}
