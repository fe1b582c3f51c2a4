use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's link, ordered on the profile by ascending `position`
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub position: i64,
    /// Inactive links stay with the owner but are hidden on the public profile
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a link; the position is assigned on insert
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub is_active: bool,
}

/// Request body for creating a link
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Request body for updating a link
#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Link {
    /// Accept only absolute http(s) URLs so click redirects cannot be
    /// pointed at `javascript:` or other schemes
    pub fn validate_url(raw: &str) -> bool {
        match url::Url::parse(raw) {
            Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
            Err(_) => false,
        }
    }
}

/// Treat blank icons as absent
pub fn normalize_icon(icon: Option<String>) -> Option<String> {
    icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(Link::validate_url("https://example.com"));
        assert!(Link::validate_url("http://example.com/path?q=1"));

        assert!(!Link::validate_url("javascript:alert(1)"));
        assert!(!Link::validate_url("ftp://example.com"));
        assert!(!Link::validate_url("example.com"));
        assert!(!Link::validate_url(""));
    }

    #[test]
    fn test_normalize_icon() {
        assert_eq!(normalize_icon(None), None);
        assert_eq!(normalize_icon(Some("   ".to_string())), None);
        assert_eq!(normalize_icon(Some(" 🔗 ".to_string())), Some("🔗".to_string()));
    }
}
