// handlers/public/root.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service info and route overview
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "Budget API (Rust)",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Personal finance tracker backend: budget ledger, category catalog and token auth",
        "environment": state.config.environment,
        "endpoints": {
            "auth": "/api/users, /api/users/login (public - token acquisition)",
            "home": "/api/home (protected)",
            "budget": "/api/getUserBudget, /api/addBudget, /api/updateBudget, /api/deleteBudget, /api/budgetSummary (protected)",
            "categories": "/api/getcategories (protected), /api/category, /api/updatecategory/:id, /api/deletecategory/:id (admin)",
            "cards": "/api/usercard[/:id], /api/usercards (protected)",
            "feedback": "/api/fedback (POST protected, GET admin)",
            "users": "/api/users/profile (protected), /api/users, /api/users/:id/role (admin)",
            "uploads": "/uploads/* (public)",
        }
    }))
}

/// GET /health - Store reachability
///
/// Expected Output (Success):
/// ```json
/// { "status": "ok", "timestamp": "...", "database": "postgres" }
/// ```
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": backend
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed on {}: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": backend,
                    "error": "database unavailable"
                })),
            )
        }
    }
}
