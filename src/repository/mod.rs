//! Persistence layer over the SQLite pool.
//!
//! Each repository holds a clone of the pool and no other state, so they are
//! cheap to clone into handlers and safe to call concurrently. Lookups return
//! `Ok(None)` for missing rows; `Err` always means the storage layer failed.

pub mod analytics;
pub mod link;
pub mod user;

pub use analytics::AnalyticsRepository;
pub use link::LinkRepository;
pub use user::UserRepository;
