pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod testing;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router.
///
/// Request flow through the identity layers: authenticate (real identity)
/// -> effective session (impersonation resolution) -> route gate (access
/// policy) -> handler. Handlers never re-derive role logic.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        .merge(dashboard_routes())
        .merge(console_routes())
        // Identity layers; the last .layer() added runs first
        .layer(from_fn(middleware::route_gate_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::effective_session_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::authenticate_middleware,
        ))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
}

fn dashboard_routes() -> Router<AppState> {
    use handlers::dashboard::{campaigns, contacts, credits, session, templates};

    Router::new()
        // Session and impersonation lifecycle (end/status live here so an
        // impersonating admin, who is locked out of the console, can revert)
        .route("/dashboard", get(session::get_session))
        .route("/dashboard/session", get(session::get_session))
        .route(
            "/dashboard/impersonation",
            get(session::impersonation_status).delete(session::end_impersonation),
        )
        // Campaigns
        .route("/dashboard/campaigns", get(campaigns::list).post(campaigns::create))
        .route(
            "/dashboard/campaigns/:id",
            get(campaigns::get)
                .put(campaigns::update)
                .delete(campaigns::delete),
        )
        // Templates
        .route("/dashboard/templates", get(templates::list).post(templates::create))
        .route(
            "/dashboard/templates/:id",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        // Contact lists, members, subscriptions
        .route("/dashboard/lists", get(contacts::list_lists).post(contacts::create_list))
        .route(
            "/dashboard/lists/:id",
            put(contacts::update_list).delete(contacts::delete_list),
        )
        .route(
            "/dashboard/lists/:id/members",
            get(contacts::list_members).post(contacts::add_member),
        )
        .route(
            "/dashboard/lists/:id/members/:member_id",
            delete(contacts::remove_member),
        )
        .route(
            "/dashboard/lists/:id/members/:member_id/subscription",
            put(contacts::set_subscription),
        )
        // Credits (read-only in the dashboard)
        .route("/dashboard/credits", get(credits::overview))
}

fn console_routes() -> Router<AppState> {
    use handlers::console::{audit, companies, credits, impersonation, users};

    Router::new()
        .route("/admin", get(console_home))
        // Companies
        .route("/admin/companies", get(companies::list).post(companies::create))
        .route("/admin/companies/:id", get(companies::get).put(companies::update))
        // Users
        .route("/admin/users", get(users::list).post(users::create))
        .route("/admin/users/:id", get(users::get).put(users::update))
        // Credit ledger
        .route("/admin/credits", post(credits::adjust))
        // Audit log
        .route("/admin/audit", get(audit::recent))
        // Impersonation start (end is a dashboard route)
        .route("/admin/impersonation", post(impersonation::start))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Textwave API",
            "version": version,
            "description": "Multi-tenant SMS marketing back office built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login, /auth/register, /auth/logout (public)",
                "dashboard": "/dashboard/* (tenant identity required)",
                "console": "/admin/* (super admin only)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

async fn console_home(
    axum::Extension(actor): axum::Extension<crate::database::models::Account>,
) -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "console": "Textwave super-admin console",
            "admin": { "id": actor.id, "email": actor.email },
            "endpoints": {
                "companies": "/admin/companies[/:id]",
                "users": "/admin/users[/:id]",
                "credits": "/admin/credits",
                "audit": "/admin/audit",
                "impersonation": "/admin/impersonation (POST to start)",
            }
        }
    }))
}
