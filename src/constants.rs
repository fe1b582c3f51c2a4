/// Name of the signed session cookie
pub const SESSION_COOKIE_NAME: &str = "session";

/// Fallback HMAC key used outside production when SESSION_SECRET is unset
pub const DEV_SESSION_SECRET: &str = "change-me-in-production";

/// Minimum session secret length accepted in production (32 bytes)
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Minimum password length for registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Username length bounds
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum length kept for link titles
pub const MAX_TITLE_LEN: usize = 200;

/// Largest position a link may hold, so `max(position) + 1` never overflows
pub const MAX_LINK_POSITION: i64 = i32::MAX as i64;

/// Maximum length kept for referrer and user-agent strings
/// These come straight from request headers and are untrusted
pub const MAX_HEADER_VALUE_LEN: usize = 512;

/// Window used for the dashboard analytics summary
pub const DASHBOARD_SUMMARY_DAYS: u32 = 28;

/// Upper bound for the analytics summary window
pub const MAX_SUMMARY_DAYS: u32 = 365;

/// Theme assigned to newly registered users
pub const DEFAULT_THEME: &str = "light";

// =============================================================================
// Database Pool
// =============================================================================

pub const DB_MAX_CONNECTIONS: u32 = 25;
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 10;
pub const DB_IDLE_TIMEOUT_SECS: u64 = 60;
pub const DB_MAX_LIFETIME_SECS: u64 = 300;

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_MISSING_LOGIN_FIELDS: &str = "Email and password are required";

pub const ERR_MISSING_REGISTER_FIELDS: &str = "All fields are required";

pub const ERR_MISSING_LINK_FIELDS: &str = "Title and URL are required";

pub const ERR_INVALID_URL: &str = "URL must be an absolute http or https URL";

pub const ERR_INVALID_USERNAME: &str =
    "Username must be 3-32 characters of letters, digits, '_' or '-'";

pub const ERR_INVALID_EMAIL: &str = "Invalid email address";

pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

pub const ERR_TITLE_TOO_LONG: &str = "Title must be at most 200 characters";

pub const ERR_INVALID_AVATAR_URL: &str = "Avatar URL must be an absolute http or https URL";

pub const ERR_INVALID_POSITION: &str = "Link positions must be between 0 and 2147483647";

pub const ERR_POSITION_LIMIT: &str = "Link position limit reached, reorder links before adding more";

pub const ERR_INVALID_BODY: &str = "Invalid request body";

pub const ERR_INVALID_QUERY: &str = "Invalid query parameters";

pub const ERR_INVALID_PATH: &str = "Invalid path parameter";
