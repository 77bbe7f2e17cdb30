use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::database::models::{Role, User};
use crate::database::Store;
use crate::error::ApiError;

/// Same message for unknown email and wrong password
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Fields a user may change on their own profile
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a plain user account
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<User, ApiError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        validate_username_format(username).map_err(|m| ApiError::field("username", m))?;
        validate_email_format(&email).map_err(|m| ApiError::field("email", m))?;
        validate_password(password).map_err(|m| ApiError::field("password", m))?;

        self.ensure_available(None, Some(username), Some(&email)).await?;

        let user = User::new(username.to_string(), email, hash_password(password)?);
        let user = self.store.insert_user(user).await?;
        tracing::info!("Registered user '{}' ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials; bad email and bad password look the same to the caller
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }

        let Some(user) = self.store.find_user_by_email(email.trim()).await? else {
            tracing::debug!("Login failed: unknown email");
            return Err(ApiError::bad_request(BAD_CREDENTIALS));
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!("Login failed: wrong password for '{}'", user.username);
            return Err(ApiError::bad_request(BAD_CREDENTIALS));
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User, ApiError> {
        let mut user = self.get(user_id).await?;

        let username = update.username.as_deref().map(str::trim).filter(|u| *u != user.username);
        let email = update
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| *e != user.email);

        if let Some(username) = username {
            validate_username_format(username).map_err(|m| ApiError::field("username", m))?;
        }
        if let Some(email) = email.as_deref() {
            validate_email_format(email).map_err(|m| ApiError::field("email", m))?;
        }
        if let Some(password) = update.password.as_deref() {
            validate_password(password).map_err(|m| ApiError::field("password", m))?;
        }

        self.ensure_available(Some(user.id), username, email.as_deref()).await?;

        if let Some(username) = username {
            user.username = username.to_string();
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(password) = update.password.as_deref() {
            user.password_hash = hash_password(password)?;
        }

        self.store.update_user(&user).await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn set_role(&self, user_id: Uuid, role: Role) -> Result<User, ApiError> {
        let mut user = self.get(user_id).await?;
        user.role = role;
        self.store.update_user(&user).await?;
        tracing::info!("Role of '{}' set to {}", user.username, role.as_str());
        Ok(user)
    }

    /// Friendly pre-check; the store's uniqueness rule is what actually holds
    async fn ensure_available(
        &self,
        current: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ApiError> {
        let is_other = |found: &Option<User>| found.as_ref().map_or(false, |u| Some(u.id) != current);

        if let Some(username) = username {
            if is_other(&self.store.find_user_by_username(username).await?) {
                return Err(ApiError::conflict(format!("Username '{}' is already taken", username)));
            }
        }
        if let Some(email) = email {
            if is_other(&self.store.find_user_by_email(email).await?) {
                return Err(ApiError::conflict(format!("Email '{}' is already registered", email)));
            }
        }
        Ok(())
    }
}

/// Validate username format and requirements
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.chars().count() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.chars().count() > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    // Must start with alphanumeric
    if !username.chars().next().map_or(false, char::is_alphanumeric) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

/// Validate email format
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    // Domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn username_rules() {
        assert!(validate_username_format("alice").is_ok());
        assert!(validate_username_format("al").is_err());
        assert!(validate_username_format("_alice").is_err());
        assert!(validate_username_format("alice smith").is_err());
        assert!(validate_username_format(&"a".repeat(51)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("a@x").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@@x.com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
        assert!(validate_email_format("a@x.").is_err());
    }

    #[tokio::test]
    async fn signup_then_login() {
        let users = service();
        let alice = users.signup("alice", "A@x.com", "Abc12345!").await.unwrap();
        assert_eq!(alice.email, "a@x.com");
        assert_eq!(alice.role, Role::User);

        let logged_in = users.login("a@x.com", "Abc12345!").await.unwrap();
        assert_eq!(logged_in.id, alice.id);

        let wrong = users.login("a@x.com", "nope-nope").await.unwrap_err();
        let unknown = users.login("b@x.com", "Abc12345!").await.unwrap_err();
        assert_eq!(wrong.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(wrong.message(), unknown.message());
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_with_400() {
        let users = service();
        users.signup("alice", "a@x.com", "Abc12345!").await.unwrap();

        let err = users.signup("alice", "other@x.com", "Abc12345!").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = users.signup("bob", "a@x.com", "Abc12345!").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn profile_update_changes_credentials() {
        let users = service();
        let alice = users.signup("alice", "a@x.com", "Abc12345!").await.unwrap();
        users.signup("bob", "b@x.com", "Abc12345!").await.unwrap();

        let clash = ProfileUpdate { username: Some("bob".into()), ..Default::default() };
        assert!(users.update_profile(alice.id, clash).await.is_err());

        let update = ProfileUpdate {
            email: Some("alice@x.com".into()),
            password: Some("NewPass123".into()),
            ..Default::default()
        };
        let updated = users.update_profile(alice.id, update).await.unwrap();
        assert_eq!(updated.email, "alice@x.com");
        assert!(users.login("alice@x.com", "NewPass123").await.is_ok());
        assert!(users.login("a@x.com", "Abc12345!").await.is_err());
    }

    #[tokio::test]
    async fn set_role_promotes() {
        let users = service();
        let alice = users.signup("alice", "a@x.com", "Abc12345!").await.unwrap();
        let promoted = users.set_role(alice.id, Role::Admin).await.unwrap();
        assert!(promoted.is_admin());
    }
}
