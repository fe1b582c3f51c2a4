//! linkbio library
//!
//! Link-in-bio service: users keep an ordered list of links shown on a public
//! profile page, and profile views and link clicks are summarized as analytics.
//! This module exports the core types and the router for `main` and tests.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod recorder;
pub mod repository;
pub mod routes;
pub mod security;
pub mod server;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};
pub use recorder::{AnalyticsRecorder, RecorderHandle};
pub use server::serve_with_grace;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use governor::DefaultDirectRateLimiter;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use repository::{AnalyticsRepository, LinkRepository, UserRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub users: UserRepository,
    pub links: LinkRepository,
    pub analytics: AnalyticsRepository,
    pub recorder: AnalyticsRecorder,
    pub limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    /// Create a new AppState with the given database, configuration and recorder
    pub fn new(db: Db, config: Config, recorder: AnalyticsRecorder) -> Self {
        let limiter = Arc::new(routes::rate_limit::build_limiter(config.rate_limit));

        Self {
            users: UserRepository::new(db.clone()),
            links: LinkRepository::new(db.clone()),
            analytics: AnalyticsRepository::new(db.clone()),
            db,
            config,
            recorder,
            limiter,
        }
    }
}

/// Build the full application router with middleware
pub fn build_router(state: AppState) -> Router {
    use routes::*;

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let api = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", put(update_profile))
        .route("/links", post(create_link))
        .route("/links/reorder", post(reorder_links))
        .route("/links/:id", put(update_link).delete(delete_link))
        .route("/analytics", get(analytics_summary));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/u/:username", get(public_profile))
        .route("/click/:id", get(click_link))
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}
