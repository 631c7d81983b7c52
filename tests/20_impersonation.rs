mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use textwave_api::database::models::AuditAction;

/// The full impersonation walk-through: super admin A assumes company admin
/// U of tenant T1, works the dashboard as U, is locked out of the console,
/// reverts, and is restored.
#[tokio::test]
async fn impersonation_end_to_end() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    // A genuine super admin is redirected out of the tenant dashboard
    let response = common::send(&test.app, "GET", "/dashboard", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/admin"));

    // Start impersonating U
    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": test.company_admin.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let delegation = common::response_cookie(&response, "tw_impersonation").unwrap();

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["target"]["email"], json!("u@y.com"));
    assert_eq!(body["data"]["expires_in"], json!(8 * 3600));

    let both_cookies = format!("{}; tw_impersonation={}", admin_cookie, delegation);

    // The session query now reports the dual-identity shape
    let response =
        common::send(&test.app, "GET", "/dashboard/session", Some(&both_cookies), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let session = &body["data"];
    assert_eq!(session["is_impersonating"], json!(true));
    assert_eq!(session["email"], json!("u@y.com"));
    assert_eq!(session["role"], json!("COMPANY_ADMIN"));
    assert_eq!(session["company_id"], json!(test.company.id));
    assert_eq!(session["original"]["email"], json!("admin@x.com"));
    assert_eq!(session["original"]["role"], json!("SUPER_ADMIN"));

    // Tenant-scoped writes land in T1
    let response = common::send(
        &test.app,
        "POST",
        "/dashboard/campaigns",
        Some(&both_cookies),
        Some(json!({ "name": "Spring promo", "body": "Hello {name}!" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["company_id"], json!(test.company.id));

    // The console is off-limits while impersonating
    let response = common::send(&test.app, "GET", "/admin", Some(&both_cookies), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/dashboard"));

    // Status query shows the redacted claim
    let response = common::send(
        &test.app,
        "GET",
        "/dashboard/impersonation",
        Some(&both_cookies),
        None,
    )
    .await;
    let body = common::body_json(response).await;
    assert_eq!(body["data"]["impersonating"], json!(true));
    assert_eq!(body["data"]["claim"]["actor_email"], json!("admin@x.com"));
    assert_eq!(body["data"]["claim"]["target_email"], json!("u@y.com"));
    assert_eq!(body["data"]["claim"]["target_id"], json!(test.company_admin.id));

    // End impersonation; the cookie is cleared
    let response = common::send(
        &test.app,
        "DELETE",
        "/dashboard/impersonation",
        Some(&both_cookies),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|c| c.starts_with("tw_impersonation=") && c.contains("Max-Age=0"));
    assert!(cleared);

    // Real identity restored: console works, dashboard redirects again
    let response = common::send(&test.app, "GET", "/admin", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = common::send(&test.app, "GET", "/dashboard", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/admin"));

    // Exactly one start and one end entry, both attributed to A, never to U
    let log = test.store.audit_log();
    let impersonation_entries: Vec<_> = log
        .iter()
        .filter(|e| {
            matches!(
                e.action,
                AuditAction::StartImpersonation | AuditAction::EndImpersonation
            )
        })
        .collect();
    assert_eq!(impersonation_entries.len(), 2);
    for entry in &impersonation_entries {
        assert_eq!(entry.actor_id, test.super_admin.id);
        assert_eq!(entry.actor_email, "admin@x.com");
        assert_ne!(entry.actor_id, test.company_admin.id);
    }
    Ok(())
}

#[tokio::test]
async fn super_admin_targets_are_never_impersonable() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": test.super_admin.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn inactive_target_is_invalid_state() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": test.inactive.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], json!("INVALID_STATE"));
    Ok(())
}

#[tokio::test]
async fn unknown_target_is_not_found() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn nested_impersonation_is_rejected() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": test.company_admin.id })),
    )
    .await;
    let delegation = common::response_cookie(&response, "tw_impersonation").unwrap();

    // Starting again while the first delegation is live cannot reach the
    // handler - the gate bounces impersonating admins off the console
    let both_cookies = format!("{}; tw_impersonation={}", admin_cookie, delegation);
    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&both_cookies),
        Some(json!({ "target_id": test.member.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::redirect_target(&response).as_deref(), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn ending_without_a_session_is_invalid_state() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let response = common::send(
        &test.app,
        "DELETE",
        "/dashboard/impersonation",
        Some(&user_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], json!("INVALID_STATE"));
    Ok(())
}

#[tokio::test]
async fn ending_with_a_garbled_token_is_invalid_token() -> Result<()> {
    let test = common::spawn_app();
    let user_cookie = common::login(&test.app, "u@y.com", common::USER_PASSWORD).await;

    let cookies = format!("{}; tw_impersonation=garbled", user_cookie);
    let response = common::send(
        &test.app,
        "DELETE",
        "/dashboard/impersonation",
        Some(&cookies),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["code"], json!("INVALID_TOKEN"));
    Ok(())
}

#[tokio::test]
async fn delegation_cookie_is_inert_for_ordinary_users() -> Result<()> {
    let test = common::spawn_app();
    let admin_cookie = common::login(&test.app, "admin@x.com", common::ADMIN_PASSWORD).await;

    let response = common::send(
        &test.app,
        "POST",
        "/admin/impersonation",
        Some(&admin_cookie),
        Some(json!({ "target_id": test.company_admin.id })),
    )
    .await;
    let delegation = common::response_cookie(&response, "tw_impersonation").unwrap();

    // A different, non-admin session presenting the stolen cookie stays itself
    let member_cookie = common::login(&test.app, "member@y.com", common::USER_PASSWORD).await;
    let cookies = format!("{}; tw_impersonation={}", member_cookie, delegation);
    let response = common::send(&test.app, "GET", "/dashboard/session", Some(&cookies), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["data"]["is_impersonating"], json!(false));
    assert_eq!(body["data"]["email"], json!("member@y.com"));
    Ok(())
}
