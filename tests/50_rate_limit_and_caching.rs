mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::Value;

use company_employees::config::AppConfig;

#[tokio::test]
async fn quota_is_enforced_per_client() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 2;
    config.api.rate_limit_window_secs = 300;
    let server = common::spawn_with(config).await?;

    let send = |client_ip: &'static str| {
        server
            .client
            .get(server.url("/api/v2/companies"))
            .header("x-forwarded-for", client_ip)
            .send()
    };

    let first = send("203.0.113.9").await?;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-rate-limit-limit"], "2");
    assert_eq!(first.headers()["x-rate-limit-remaining"], "1");

    assert_eq!(send("203.0.113.9").await?.status(), StatusCode::OK);

    let limited = send("203.0.113.9").await?;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key(header::RETRY_AFTER));
    let body: Value = limited.json().await?;
    assert_eq!(body["message"], "API calls quota exceeded!");

    // Another client still has its own quota
    assert_eq!(send("198.51.100.4").await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_quota_when_untrusted() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 2;
    config.api.trust_forwarded_for = false;
    let server = common::spawn_with(config).await?;

    let mut statuses = Vec::new();
    for i in 1..=5 {
        let res = server
            .client
            .get(server.url("/api/v2/companies"))
            .header("x-forwarded-for", format!("203.0.113.{}", i))
            .send()
            .await?;
        statuses.push(res.status());
    }
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS), "{:?}", statuses);
    Ok(())
}

#[tokio::test]
async fn rate_limit_headers_absent_when_disabled() -> Result<()> {
    let server = common::spawn_server().await?;
    let res = server.client.get(server.url("/api/v2/companies")).send().await?;
    assert!(!res.headers().contains_key("x-rate-limit-limit"));
    Ok(())
}

#[tokio::test]
async fn reads_carry_cache_validators() -> Result<()> {
    let server = common::spawn_server().await?;
    let url = server.url(&format!("/api/companies/{}/employees", common::IT_SOLUTIONS));

    let res = server
        .client
        .get(&url)
        .header(header::ACCEPT, "application/json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=65");
    let etag = res.headers()[header::ETAG].to_str()?.to_string();
    assert!(etag.starts_with('"'));

    let res = server
        .client
        .get(&url)
        .header(header::ACCEPT, "application/json")
        .header(header::IF_NONE_MATCH, &etag)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert!(res.bytes().await?.is_empty());

    // A different representation has a different tag
    let res = server
        .client
        .get(&url)
        .header(header::ACCEPT, common::HATEOAS)
        .header(header::IF_NONE_MATCH, &etag)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_ne!(res.headers()[header::ETAG].to_str()?, etag);
    Ok(())
}

#[tokio::test]
async fn writes_are_not_cached() -> Result<()> {
    let server = common::spawn_server().await?;
    let res = server
        .client
        .post(server.url("/api/companies"))
        .json(&serde_json::json!({ "name": "Nocache Ltd", "address": "1 Street", "country": "NL" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(!res.headers().contains_key(header::ETAG));
    Ok(())
}
