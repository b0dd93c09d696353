#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use company_employees::config::AppConfig;
use company_employees::database::{MemoryStore, RepositoryManager};
use company_employees::{app, AppState};

pub const IT_SOLUTIONS: &str = "c9d4c053-49b6-410c-bc78-2d54a9991870";
pub const ADMIN_SOLUTIONS: &str = "3d490a70-94ce-4d15-9494-5248280c2ce3";
pub const SAM_RAIDEN: &str = "80abbca8-664d-4b20-b5de-024705497d4a";
pub const JANA_MCLEAF: &str = "86dba8c0-d178-41e7-938c-ed49778fb52a";
pub const HATEOAS: &str = "application/vnd.tnguyen.hateoas+json";

/// An API instance served in-process from a freshly seeded in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
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
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_with(AppConfig::development()).await
}

pub async fn spawn_with(mut config: AppConfig) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    config.api.public_base_url = base_url.clone();

    let repository = RepositoryManager::from_store(Arc::new(MemoryStore::seeded()));
    let state = AppState::new(config, repository).context("invalid test config")?;

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    let server = TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Register `user_name` with `roles` and return a bearer token for it.
pub async fn token_for(server: &TestServer, user_name: &str, roles: &[&str]) -> Result<String> {
    let res = server
        .client
        .post(server.url("/api/authentication"))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "userName": user_name,
            "password": "Passw0rd!",
            "email": format!("{}@example.com", user_name),
            "roles": roles,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "registration failed: {}", res.status());

    let res = server
        .client
        .post(server.url("/api/authentication/login"))
        .json(&json!({ "userName": user_name, "password": "Passw0rd!" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body: Value = res.json().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}
