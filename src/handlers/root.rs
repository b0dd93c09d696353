// handlers/root.rs - service description and health check

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - API description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Company Employees API",
        "version": version,
        "environment": format!("{:?}", state.config.environment),
        "endpoints": {
            "authentication": "/api/authentication, /api/authentication/login (public)",
            "companies": "/api/companies[/:id], /api/v1/companies[/:id]",
            "companies_collection": "/api/companies/collection/(:ids)",
            "companies_v2": "/api/v2/companies",
            "employees": "/api/companies/:companyId/employees[/:id]",
        },
        "media_types": ["application/json", "text/csv", state.config.api.hateoas_media_type],
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.repository.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                })),
            )
        }
    }
}
