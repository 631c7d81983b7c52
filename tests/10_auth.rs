mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let test = common::spawn_app();

    let response = common::send(&test.app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], json!(true));
    Ok(())
}

#[tokio::test]
async fn login_returns_token_and_session_cookie() -> Result<()> {
    let test = common::spawn_app();

    let response = common::send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "u@y.com", "password": common::USER_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::response_cookie(&response, "tw_session").is_some());

    let body = common::body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["user"]["email"], json!("u@y.com"));
    assert_eq!(body["data"]["user"]["role"], json!("COMPANY_ADMIN"));
    assert!(body["data"]["token"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn login_records_last_login() -> Result<()> {
    let test = common::spawn_app();
    common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    use textwave_api::database::store::DataStore;
    let account = test
        .store
        .account_by_id(test.company_admin.id)
        .await?
        .unwrap();
    assert!(account.last_login_at.is_some());
    Ok(())
}

#[tokio::test]
async fn bad_password_unknown_email_and_inactive_account_fail_alike() -> Result<()> {
    let test = common::spawn_app();

    for (email, password) in [
        ("u@y.com", "wrong-password"),
        ("nobody@y.com", common::USER_PASSWORD),
        ("former@y.com", common::USER_PASSWORD),
    ] {
        let response = common::send(
            &test.app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "case: {}", email);

        let body = common::body_json(response).await;
        assert_eq!(body["code"], json!("INVALID_CREDENTIALS"));
    }
    Ok(())
}

#[tokio::test]
async fn register_creates_company_admin_who_can_log_in() -> Result<()> {
    let test = common::spawn_app();

    let response = common::send(
        &test.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "company_name": "Fresh Co",
            "name": "Founder",
            "email": "founder@fresh.example",
            "password": "brand-new-pass",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["user"]["role"], json!("COMPANY_ADMIN"));

    let cookie = common::login(&test.app, "founder@fresh.example", "brand-new-pass").await;
    let response = common::send(&test.app, "GET", "/dashboard/session", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicate_email() -> Result<()> {
    let test = common::spawn_app();

    let response = common::send(
        &test.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "company_name": "Copycat",
            "name": "Copy",
            "email": "u@y.com",
            "password": "whatever-pass",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_and_impersonation_cookies() -> Result<()> {
    let test = common::spawn_app();
    let cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let response = common::send(&test.app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared: Vec<String> = response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect();
    assert!(cleared.iter().any(|c| c.starts_with("tw_session=") && c.contains("Max-Age=0")));
    assert!(cleared
        .iter()
        .any(|c| c.starts_with("tw_impersonation=") && c.contains("Max-Age=0")));
    Ok(())
}

#[tokio::test]
async fn bearer_token_authenticates_like_the_cookie() -> Result<()> {
    let test = common::spawn_app();

    let response = common::send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "u@y.com", "password": common::USER_PASSWORD })),
    )
    .await;
    let body = common::body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    let request = Request::builder()
        .method("GET")
        .uri("/dashboard/session")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
