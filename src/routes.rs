// routes.rs - Router assembly
//
// Public routes take no token. Protected routes run jwt_auth_middleware.
// Admin routes run jwt_auth_middleware and then require_admin_middleware.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{admin, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::services::catalog_service::UPLOADS_ROUTE;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_request_size_bytes;
    let uploads = ServeDir::new(&state.config.uploads.dir);
    let cors = cors_layer(&state);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/users", post(public::users_signup))
        .route("/api/users/login", post(public::users_login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/home", get(protected::home_get))
        .route("/api/users/profile", put(protected::profile_put))
        // Budget ledger
        .route("/api/getUserBudget", get(protected::budget_get))
        .route("/api/addBudget", post(protected::budget_post))
        .route("/api/updateBudget", put(protected::budget_put))
        .route("/api/deleteBudget", delete(protected::budget_delete))
        .route("/api/budgetSummary", get(protected::budget_summary))
        // Catalog
        .route("/api/getcategories", get(protected::category_list))
        .route("/api/usercard", post(protected::card_post))
        .route("/api/usercards", get(protected::card_list))
        .route(
            "/api/usercard/:id",
            put(protected::card_put).delete(protected::card_delete),
        )
        .route("/api/fedback", post(protected::feedback_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    // Layers run outside-in, so the JWT layer is added last
    Router::new()
        .route("/api/users", get(admin::user_list))
        .route("/api/users/:id/role", put(admin::user_set_role))
        .route("/api/category", post(admin::category_post))
        .route("/api/updatecategory/:id", put(admin::category_put))
        .route("/api/deletecategory/:id", delete(admin::category_delete))
        .route("/api/fedback", get(admin::feedback_list))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let auth_header = HeaderName::from_bytes(security.auth_header.as_bytes()).unwrap_or(header::AUTHORIZATION);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, auth_header]);

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
