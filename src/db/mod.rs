pub mod pool;

use std::path::Path;

pub use pool::create_pool;

use crate::error::{AppError, Result};

/// Database handle type (the pool is internally reference counted)
pub type Db = sqlx::SqlitePool;

/// Open or create the SQLite database at the given path
///
/// Creates the parent directory and applies pending migrations on first run.
pub async fn open_database(path: impl AsRef<Path>) -> Result<Db> {
    let path = path.as_ref();
    tracing::info!("Opening database at: {:?}", path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                AppError::Database(sqlx::Error::Io(e))
            })?;
        }
    }

    let db = create_pool(path).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database initialized successfully");

    Ok(db)
}

/// Check connectivity with a trivial query
pub async fn ping(db: &Db) -> Result<()> {
    sqlx::query("SELECT 1").execute(db).await?;
    Ok(())
}
