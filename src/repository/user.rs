use crate::db::Db;
use crate::error::Result;
use crate::models::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, display_name, bio, avatar_url, theme, created_at";

/// User persistence
#[derive(Clone)]
pub struct UserRepository {
    db: Db,
}

impl UserRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a new user
    ///
    /// Duplicate usernames or emails fail with a UNIQUE violation from the
    /// storage layer; see [`crate::AppError::is_unique_violation`].
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, display_name, theme)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.display_name)
            .bind(&new_user.theme)
            .fetch_one(&self.db)
            .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Overwrite the editable profile fields
    pub async fn update_profile(&self, user_id: i64, profile: &ProfileUpdate) -> Result<()> {
        sqlx::query(
            "UPDATE users SET display_name = ?, bio = ?, avatar_url = ?, theme = ? WHERE id = ?",
        )
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(&profile.theme)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
