use std::env;
use std::time::Duration;

use crate::constants::{DEV_SESSION_SECRET, MIN_SESSION_SECRET_LEN};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub session_secret: String,
    pub session_max_age_secs: i64,
    pub rate_limit: u32,
    pub analytics_queue_capacity: usize,
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/linkbio.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == "production" => {
                return Err("SESSION_SECRET must be set in production".to_string());
            }
            Err(_) => {
                tracing::warn!("SESSION_SECRET not set, using development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        if environment == "production" && session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(format!(
                "SESSION_SECRET must be at least {} bytes in production",
                MIN_SESSION_SECRET_LEN
            ));
        }

        let session_max_age_secs = env::var("SESSION_MAX_AGE_SECS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .map_err(|_| "Invalid SESSION_MAX_AGE_SECS")?;

        let rate_limit = env::var("RATE_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid RATE_LIMIT")?;

        let analytics_queue_capacity = env::var("ANALYTICS_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "1024".to_string())
            .parse()
            .map_err(|_| "Invalid ANALYTICS_QUEUE_CAPACITY")?;

        let shutdown_grace_secs = env::var("SHUTDOWN_GRACE_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid SHUTDOWN_GRACE_SECS")?;

        Ok(Config {
            server_host,
            server_port,
            environment,
            log_level,
            database_path,
            allowed_origins,
            session_secret,
            session_max_age_secs,
            rate_limit,
            analytics_queue_capacity,
            shutdown_grace_secs,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
