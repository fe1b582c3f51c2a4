pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod links;
pub mod profile;
pub mod rate_limit;

pub use auth::{login, logout, register};
pub use dashboard::{analytics_summary, dashboard};
pub use extract::CurrentUser;
pub use health::health_check;
pub use links::{click_link, create_link, delete_link, reorder_links, update_link};
pub use profile::{public_profile, update_profile};
pub use rate_limit::rate_limit;

use axum::http::{HeaderMap, HeaderName};

/// Header value as a string, empty when missing or not valid UTF-8
pub(crate) fn header_str(headers: &HeaderMap, name: HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
