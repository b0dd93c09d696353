mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_then_login_issues_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::token_for(&server, "jdoe", &["Manager"]).await?;
    assert_eq!(token.split('.').count(), 3, "expected a compact JWT");
    Ok(())
}

#[tokio::test]
async fn duplicate_user_name_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    common::token_for(&server, "jdoe", &["Manager"]).await?;

    let res = server
        .client
        .post(server.url("/api/authentication"))
        .json(&json!({ "userName": "JDOE", "password": "another", "roles": ["Manager"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn registration_with_unknown_role_is_invalid() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/api/authentication"))
        .json(&json!({ "userName": "jdoe", "password": "Passw0rd!", "roles": ["Janitor"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["roles"], "Unknown roles: Janitor");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    common::token_for(&server, "jdoe", &["Manager"]).await?;

    let res = server
        .client
        .post(server.url("/api/authentication/login"))
        .json(&json!({ "userName": "jdoe", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn company_list_requires_manager_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/api/companies")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/companies"))
        .bearer_auth("not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let admin = common::token_for(&server, "admin", &["Administrator"]).await?;
    let res = server
        .client
        .get(server.url("/api/companies"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let manager = common::token_for(&server, "manager", &["Manager"]).await?;
    let res = server
        .client
        .get(server.url("/api/companies"))
        .bearer_auth(&manager)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
