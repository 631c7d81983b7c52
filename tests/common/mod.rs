use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use textwave_api::app;
use textwave_api::auth::password;
use textwave_api::database::models::{Account, Company, Role};
use textwave_api::state::AppState;
use textwave_api::testing::{fixtures, MemoryStore};

pub const ADMIN_PASSWORD: &str = "admin-password-1";
pub const USER_PASSWORD: &str = "user-password-1";

/// In-process application over a fresh in-memory store, seeded with the
/// canonical cast: super admin A, company T1 with an admin and a member,
/// plus one inactive account.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub super_admin: Account,
    pub company: Company,
    pub company_admin: Account,
    pub member: Account,
    pub inactive: Account,
}

// Argon2 is deliberately slow; hash each test password once per binary
static ADMIN_HASH: OnceLock<String> = OnceLock::new();
static USER_HASH: OnceLock<String> = OnceLock::new();

fn hash_of(password: &str, cell: &OnceLock<String>) -> String {
    cell.get_or_init(|| password::hash_password(password).unwrap())
        .clone()
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let mut super_admin = fixtures::super_admin();
    super_admin.email = "admin@x.com".to_string();
    super_admin.name = "Platform Admin".to_string();
    super_admin.password_hash = hash_of(ADMIN_PASSWORD, &ADMIN_HASH);
    store.seed_account(super_admin.clone());

    let mut company = fixtures::company();
    company.name = "Tenant One".to_string();
    store.seed_company(company.clone());

    let mut company_admin = fixtures::user(company.id);
    company_admin.role = Role::CompanyAdmin;
    company_admin.email = "u@y.com".to_string();
    company_admin.name = "Tenant Admin".to_string();
    company_admin.password_hash = hash_of(USER_PASSWORD, &USER_HASH);
    store.seed_account(company_admin.clone());

    let mut member = fixtures::user(company.id);
    member.email = "member@y.com".to_string();
    member.password_hash = hash_of(USER_PASSWORD, &USER_HASH);
    store.seed_account(member.clone());

    let mut inactive = fixtures::user(company.id);
    inactive.email = "former@y.com".to_string();
    inactive.password_hash = hash_of(USER_PASSWORD, &USER_HASH);
    inactive.is_active = false;
    store.seed_account(inactive.clone());

    let state = AppState::new(store.clone(), store.clone());

    TestApp {
        app: app(state),
        store,
        super_admin,
        company,
        company_admin,
        member,
        inactive,
    }
}

/// Send a request through the router. `cookies` is a ready Cookie header
/// value ("tw_session=...; tw_impersonation=...").
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookies: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Pull a named cookie's value out of the response's Set-Cookie headers.
pub fn response_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let (pair, _) = cookie.split_once(';')?;
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| v.to_string())
        })
}

/// Location header of a redirect response.
pub fn redirect_target(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Log in and return the session Cookie header value.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login failed for {}", email);

    let token = response_cookie(&response, "tw_session").expect("session cookie not set");
    format!("tw_session={}", token)
}
