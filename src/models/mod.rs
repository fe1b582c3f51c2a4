pub mod analytics;
pub mod link;
pub mod user;

pub use analytics::{AnalyticsSummary, EventType, LinkClickCount};
pub use link::{CreateLinkRequest, Link, NewLink, UpdateLinkRequest};
pub use user::{NewUser, ProfileUpdate, PublicProfile, User};
