use std::collections::BTreeMap;

use crate::constants::{ERR_POSITION_LIMIT, MAX_LINK_POSITION};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Link, NewLink};

const LINK_COLUMNS: &str = "id, user_id, title, url, icon, position, is_active, created_at";

/// Persistence for each user's ordered link list
///
/// Lookups and mutations by link id do not check ownership. Callers must
/// compare `Link::user_id` with the authenticated user before acting.
#[derive(Clone)]
pub struct LinkRepository {
    db: Db,
}

impl LinkRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a link at the end of the user's list
    ///
    /// The position is `max(position) + 1` for the owner (1 for the first
    /// link), computed inside the INSERT so it is atomic with the write.
    /// Nothing is written when that position would pass `MAX_LINK_POSITION`.
    pub async fn create(&self, new_link: &NewLink) -> Result<Link> {
        let query = format!(
            "INSERT INTO links (user_id, title, url, icon, position, is_active)
             SELECT ?, ?, ?, ?, next_position, ?
             FROM (SELECT COALESCE(MAX(position), 0) + 1 AS next_position
                   FROM links WHERE user_id = ?)
             WHERE next_position <= ?
             RETURNING {LINK_COLUMNS}"
        );

        let link = sqlx::query_as::<_, Link>(&query)
            .bind(new_link.user_id)
            .bind(&new_link.title)
            .bind(&new_link.url)
            .bind(&new_link.icon)
            .bind(new_link.is_active)
            .bind(new_link.user_id)
            .bind(MAX_LINK_POSITION)
            .fetch_optional(&self.db)
            .await?;

        link.ok_or_else(|| {
            tracing::warn!(user_id = new_link.user_id, "Link position limit reached");
            AppError::InvalidInput(ERR_POSITION_LIMIT.to_string())
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Link>> {
        let query = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?");
        let link = sqlx::query_as::<_, Link>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(link)
    }

    /// All links for the owner's dashboard, including inactive ones
    pub async fn get_by_user_id(&self, user_id: i64) -> Result<Vec<Link>> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE user_id = ? ORDER BY position ASC, id ASC"
        );
        let links = sqlx::query_as::<_, Link>(&query)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(links)
    }

    /// Active links only, for the public profile
    pub async fn get_active_by_user_id(&self, user_id: i64) -> Result<Vec<Link>> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE user_id = ? AND is_active = 1
             ORDER BY position ASC, id ASC"
        );
        let links = sqlx::query_as::<_, Link>(&query)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(links)
    }

    /// Overwrite title, url, icon and active flag. Position is left alone.
    pub async fn update(&self, link: &Link) -> Result<()> {
        sqlx::query("UPDATE links SET title = ?, url = ?, icon = ?, is_active = ? WHERE id = ?")
            .bind(&link.title)
            .bind(&link.url)
            .bind(&link.icon)
            .bind(link.is_active)
            .bind(link.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Assign new positions in a single transaction
    ///
    /// Every UPDATE is filtered by both link id and owner, so entries naming
    /// another user's link match no rows and are skipped without error. Any
    /// failure rolls the whole batch back. Positions are stored as given;
    /// duplicates and gaps are the caller's concern.
    pub async fn update_positions(
        &self,
        user_id: i64,
        positions: &BTreeMap<i64, i64>,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let mut skipped = 0usize;

        for (link_id, position) in positions {
            let result = sqlx::query("UPDATE links SET position = ? WHERE id = ? AND user_id = ?")
                .bind(position)
                .bind(link_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                skipped += 1;
            }
        }

        tx.commit().await?;

        if skipped > 0 {
            tracing::debug!(user_id, skipped, "reorder skipped links not owned by user");
        }

        Ok(())
    }

    /// Number of links (active and inactive) owned by the user
    pub async fn count_by_user_id(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
