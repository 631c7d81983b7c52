mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn public_routes_need_no_identity() -> Result<()> {
    let test = common::spawn_app();

    for path in ["/", "/health"] {
        let response = common::send(&test.app, "GET", path, None, None).await;
        assert_eq!(response.status(), StatusCode::OK, "path: {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn protected_routes_redirect_anonymous_callers_to_sign_in() -> Result<()> {
    let test = common::spawn_app();

    for path in ["/dashboard", "/dashboard/campaigns", "/admin", "/admin/users"] {
        let response = common::send(&test.app, "GET", path, None, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path: {}", path);
        assert_eq!(
            common::redirect_target(&response).as_deref(),
            Some("/auth/login"),
            "path: {}",
            path
        );
    }
    Ok(())
}

#[tokio::test]
async fn auth_pages_redirect_signed_in_callers_by_role() -> Result<()> {
    let test = common::spawn_app();

    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;
    let response = common::send(
        &test.app,
        "POST",
        "/auth/login",
        Some(&user_cookie),
        Some(json!({ "email": "u@y.com", "password": common::USER_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/dashboard"));

    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;
    let response = common::send(
        &test.app,
        "POST",
        "/auth/register",
        Some(&admin_cookie),
        Some(json!({
            "company_name": "X",
            "name": "X",
            "email": "x@x.com",
            "password": "password-x1",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/admin"));
    Ok(())
}

#[tokio::test]
async fn logout_is_reachable_while_signed_in() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let response = common::send(&test.app, "POST", "/auth/logout", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn tenant_users_reach_the_dashboard_but_not_the_console() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let response = common::send(&test.app, "GET", "/dashboard", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["is_impersonating"], json!(false));
    assert_eq!(body["data"]["email"], json!("u@y.com"));
    assert!(body["data"].get("original").is_none());

    let response = common::send(&test.app, "GET", "/admin", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/auth/login"));
    Ok(())
}

#[tokio::test]
async fn super_admin_reaches_the_console_but_not_the_dashboard() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(&test.app, "GET", "/admin", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::send(&test.app, "GET", "/dashboard", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/admin"));
    Ok(())
}

#[tokio::test]
async fn deactivated_accounts_lose_access_immediately() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    // Deactivate behind the live session's back
    use textwave_api::database::store::DataStore;
    let mut account = test.store.account_by_id(test.company_admin.id).await?.unwrap();
    account.is_active = false;
    test.store.update_account(&account).await?;

    // The still-valid session token no longer authenticates
    let response = common::send(&test.app, "GET", "/dashboard", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/auth/login"));
    Ok(())
}

#[tokio::test]
async fn dashboard_crud_is_scoped_to_the_effective_company() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/dashboard/lists",
        Some(&user_cookie),
        Some(json!({ "name": "VIP customers" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["company_id"], json!(test.company.id));
    let list_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = common::send(
        &test.app,
        "POST",
        &format!("/dashboard/lists/{}/members", list_id),
        Some(&user_cookie),
        Some(json!({ "phone": "+1 555 010 0100", "name": "First" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["subscribed"], json!(true));
    let member_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = common::send(
        &test.app,
        "PUT",
        &format!("/dashboard/lists/{}/members/{}/subscription", list_id, member_id),
        Some(&user_cookie),
        Some(json!({ "subscribed": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["subscribed"], json!(false));
    Ok(())
}

#[tokio::test]
async fn console_credit_adjustment_writes_ledger_and_audit() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/credits",
        Some(&admin_cookie),
        Some(json!({
            "company_id": test.company.id,
            "delta": 1000,
            "reason": "Launch grant",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["balance_after"], json!(1000));

    // The company's own dashboard sees the new balance
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;
    let response =
        common::send(&test.app, "GET", "/dashboard/credits", Some(&user_cookie), None).await;
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["balance"], json!(1000));
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 1);

    // And the audit trail names the acting admin
    let response = common::send(&test.app, "GET", "/admin/audit", Some(&admin_cookie), None).await;
    let body = common::body_json(response).await;
    let entries = body["data"].as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["action"] == json!("CREDIT_ADJUSTMENT") && e["actor_email"] == json!("admin@x.com")));
    Ok(())
}
