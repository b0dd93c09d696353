use std::collections::HashMap;
use std::time::Duration;

use axum::{
    handler::Handler,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::api::links::{route_names, RouteResolver};
use crate::config::{ApiConfig, SecurityConfig};
use crate::handlers::{authentication, companies, companies_v2, employees, root};
use crate::middleware::{cache_headers, jwt_auth, rate_limit};
use crate::state::AppState;

/// Named route templates resolved against the public base URL.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: Url,
    templates: HashMap<&'static str, &'static str>,
}

impl RouteTable {
    pub fn new(base: Url) -> Self {
        let templates = HashMap::from([
            (route_names::GET_COMPANY, "/api/companies/{id}"),
            (route_names::COMPANY_COLLECTION, "/api/companies/collection/({ids})"),
            (route_names::GET_EMPLOYEE_FOR_COMPANY, "/api/companies/{companyId}/employees/{id}"),
            (route_names::GET_EMPLOYEES_FOR_COMPANY, "/api/companies/{companyId}/employees"),
            (route_names::CREATE_EMPLOYEE_FOR_COMPANY, "/api/companies/{companyId}/employees"),
        ]);
        Self { base, templates }
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, url::ParseError> {
        Url::parse(&api.public_base_url).map(Self::new)
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, route_name: &str, params: &[(&str, String)]) -> String {
        let Some(template) = self.templates.get(route_name) else {
            tracing::warn!("No route registered under name '{}'", route_name);
            return self.base.to_string();
        };

        let mut path = template.to_string();
        for (key, value) in params {
            path = path.replace(&format!("{{{}}}", key), value);
        }

        match self.base.join(&path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base.as_str().trim_end_matches('/'), path),
        }
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .merge(authentication_routes())
        // Version 1 answers on both the bare and the versioned prefix
        .merge(company_routes("/api/companies", &state))
        .merge(company_routes("/api/v1/companies", &state))
        .merge(companies_v2_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), cache_headers))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn authentication_routes() -> Router<AppState> {
    Router::new()
        .route("/api/authentication", post(authentication::register))
        .route("/api/authentication/login", post(authentication::login))
}

fn company_routes(prefix: &str, state: &AppState) -> Router<AppState> {
    let managers_only = companies::list.layer(from_fn_with_state(state.clone(), jwt_auth));

    Router::new()
        .route(
            prefix,
            get(managers_only)
                .post(companies::create)
                .options(companies::options),
        )
        .route(&format!("{}/collection", prefix), post(companies::create_collection))
        .route(&format!("{}/collection/:ids", prefix), get(companies::get_collection))
        .route(
            &format!("{}/:id", prefix),
            get(companies::get)
                .put(companies::update)
                .delete(companies::delete),
        )
        .route(
            &format!("{}/:company_id/employees", prefix),
            get(employees::list).post(employees::create),
        )
        .route(
            &format!("{}/:company_id/employees/:id", prefix),
            get(employees::get)
                .put(employees::update)
                .patch(employees::patch)
                .delete(employees::delete),
        )
}

fn companies_v2_routes() -> Router<AppState> {
    Router::new().route("/api/v2/companies", get(companies_v2::list))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers(Any)
        .expose_headers(Any)
        .max_age(Duration::from_secs(3600));

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn table() -> RouteTable {
        RouteTable::new(Url::parse("https://api.example.com").unwrap())
    }

    #[test]
    fn resolves_templates_to_absolute_urls() {
        let company = Uuid::from_u128(1);
        let employee = Uuid::from_u128(2);
        let href = table().resolve(
            route_names::GET_EMPLOYEE_FOR_COMPANY,
            &[("companyId", company.to_string()), ("id", employee.to_string())],
        );
        assert_eq!(
            href,
            format!("https://api.example.com/api/companies/{}/employees/{}", company, employee)
        );
    }

    #[test]
    fn collection_route_keeps_parentheses() {
        let href = table().resolve(route_names::COMPANY_COLLECTION, &[("ids", "a,b".to_string())]);
        assert_eq!(href, "https://api.example.com/api/companies/collection/(a,b)");
    }

    #[test]
    fn unknown_route_falls_back_to_base() {
        assert_eq!(table().resolve("Nope", &[]), "https://api.example.com/");
    }

    mod router {
        use std::sync::Arc;

        use axum::body::{to_bytes, Body};
        use axum::http::{header, Request, StatusCode};
        use tower::ServiceExt;

        use crate::config::AppConfig;
        use crate::database::{MemoryStore, RepositoryManager};
        use crate::routes::app;
        use crate::state::AppState;

        fn router() -> axum::Router {
            let repository = RepositoryManager::from_store(Arc::new(MemoryStore::seeded()));
            app(AppState::new(AppConfig::development(), repository).unwrap())
        }

        #[tokio::test]
        async fn employee_list_links_use_public_base_url() {
            let request = Request::builder()
                .uri("/api/v1/companies/c9d4c053-49b6-410c-bc78-2d54a9991870/employees?fields=name")
                .header(header::ACCEPT, "application/vnd.tnguyen.hateoas+json")
                .body(Body::empty())
                .unwrap();

            let response = router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            let href = body["links"][0]["href"].as_str().unwrap();
            assert_eq!(
                href,
                "http://localhost:5000/api/companies/c9d4c053-49b6-410c-bc78-2d54a9991870/employees"
            );
        }

        #[tokio::test]
        async fn malformed_company_id_is_bad_request() {
            let request = Request::builder()
                .uri("/api/companies/not-a-guid")
                .body(Body::empty())
                .unwrap();
            let response = router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
