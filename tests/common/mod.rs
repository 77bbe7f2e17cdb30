#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use uuid::Uuid;

use budget_api_rust::auth::{Claims, JwtKeys};
use budget_api_rust::config::AppConfig;
use budget_api_rust::database::models::Role;
use budget_api_rust::database::{MemoryStore, UserStore};
use budget_api_rust::{app, AppState};

pub const PASSWORD: &str = "Abc12345!";

/// A 1x1 PNG, base64 encoded
pub const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// The router served on a free port with a fresh in-memory store. Each test
/// gets its own, so tests never see each other's data.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub jwt: Arc<JwtKeys>,
    pub client: reqwest::Client,
    upload_dir: PathBuf,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let upload_dir = std::env::temp_dir().join(format!("budget-api-test-{}", Uuid::new_v4()));
        let mut config = AppConfig::development();
        config.server.port = port;
        config.uploads.dir = upload_dir.clone();
        config.uploads.max_inline_image_bytes = 64 * 1024;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config)?;
        let jwt = state.jwt.clone();

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            jwt,
            client: reqwest::Client::new(),
            upload_dir,
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying the token in the compatibility header
    pub fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("x-auth-token", format!("Bearer {}", token))
    }

    pub async fn signup(&self, username: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "signup failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carries no token")
    }

    /// Sign up and log in a plain user, returning the token
    pub async fn user(&self, username: &str) -> Result<String> {
        self.signup(username).await?;
        self.login(&format!("{}@example.com", username), PASSWORD).await
    }

    /// Token for an existing user, signed with the server's key but already expired
    pub async fn expired_token(&self, username: &str) -> Result<String> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .context("user missing for expired token")?;
        let mut claims = Claims::new(&user, 1);
        claims.iat -= 3 * 3600;
        claims.exp = chrono::Utc::now().timestamp() - 3600;
        Ok(self.jwt.encode(&claims)?)
    }

    /// Sign up a user and promote them straight through the store
    pub async fn admin(&self, username: &str) -> Result<String> {
        self.signup(username).await?;
        let mut user = self
            .store
            .find_user_by_username(username)
            .await?
            .context("admin user missing after signup")?;
        user.role = Role::Admin;
        self.store.update_user(&user).await?;
        self.login(&format!("{}@example.com", username), PASSWORD).await
    }

    pub async fn create_category(&self, admin_token: &str, name: &str, kind: &str) -> Result<Value> {
        let image = reqwest::multipart::Part::bytes(format!("image for {}", name).into_bytes()).file_name("icon.png");
        let form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .text("type", kind.to_string())
            .part("image", image);

        let res = self
            .authed(Method::POST, "/api/category", admin_token)
            .multipart(form)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "category create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn create_card(&self, token: &str, name: &str, kind: &str) -> Result<Value> {
        let res = self
            .authed(Method::POST, "/api/usercard", token)
            .json(&json!({ "name": name, "type": kind, "image": PIXEL }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "card create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn budget(&self, token: &str) -> Result<Value> {
        let res = self.authed(Method::GET, "/api/getUserBudget", token).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "budget read failed: {}", res.status());
        Ok(res.json().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
