use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::api::media::SupportedMedia;
use crate::config::AppConfig;
use crate::database::RepositoryManager;
use crate::middleware::rate_limit::RateLimiter;
use crate::routes::RouteTable;

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: RepositoryManager,
    pub routes: Arc<RouteTable>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: RepositoryManager) -> Result<Self, url::ParseError> {
        let routes = RouteTable::from_config(&config.api)?;
        let rate_limiter = RateLimiter::new(config.api.rate_limit_requests, config.api.rate_limit_window_secs);
        Ok(Self {
            config: Arc::new(config),
            repository,
            routes: Arc::new(routes),
            rate_limiter: Arc::new(rate_limiter),
        })
    }

    /// Output types of the employee resource: JSON or XML, plain or hypermedia.
    pub fn employee_media(&self) -> SupportedMedia {
        SupportedMedia::new(&self.config.api.hateoas_media_type)
    }

    /// Output types of the company resource: JSON, XML and CSV.
    pub fn company_media(&self) -> SupportedMedia {
        SupportedMedia::new(&self.config.api.hateoas_media_type).with_csv()
    }
}

pub fn accept_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
}
