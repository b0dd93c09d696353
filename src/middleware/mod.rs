pub mod auth;
pub mod cache_headers;
pub mod rate_limit;

pub use auth::{jwt_auth, AuthUser};
pub use cache_headers::cache_headers;
pub use rate_limit::{rate_limit, RateLimiter};
