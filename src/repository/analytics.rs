use crate::db::Db;
use crate::error::Result;
use crate::models::{AnalyticsSummary, EventType, LinkClickCount};

/// Append-only analytics events and their aggregation
#[derive(Clone)]
pub struct AnalyticsRepository {
    db: Db,
}

impl AnalyticsRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Record a view of the user's profile page
    pub async fn record_page_view(
        &self,
        user_id: i64,
        referrer: &str,
        user_agent: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO analytics (user_id, event_type, referrer, user_agent) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(EventType::PageView.as_str())
        .bind(referrer)
        .bind(user_agent)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Record a click through one of the user's links
    pub async fn record_link_click(
        &self,
        user_id: i64,
        link_id: i64,
        referrer: &str,
        user_agent: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO analytics (user_id, link_id, event_type, referrer, user_agent)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(link_id)
        .bind(EventType::LinkClick.as_str())
        .bind(referrer)
        .bind(user_agent)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Totals and per-link clicks for events in the last `window_days` days
    ///
    /// Per-link rows carry the link's current title and are sorted by clicks,
    /// most first. No events in the window yields an all-zero summary.
    pub async fn get_summary(&self, user_id: i64, window_days: u32) -> Result<AnalyticsSummary> {
        // Compared against CURRENT_TIMESTAMP values, so build the cutoff in SQLite too
        let window = format!("-{} days", window_days);

        let (total_views, total_clicks): (i64, i64) = sqlx::query_as(
            "SELECT
                 COALESCE(SUM(CASE WHEN event_type = ? THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN event_type = ? THEN 1 ELSE 0 END), 0)
             FROM analytics
             WHERE user_id = ? AND created_at >= datetime('now', ?)",
        )
        .bind(EventType::PageView.as_str())
        .bind(EventType::LinkClick.as_str())
        .bind(user_id)
        .bind(&window)
        .fetch_one(&self.db)
        .await?;

        let link_clicks = sqlx::query_as::<_, LinkClickCount>(
            "SELECT a.link_id AS link_id, l.title AS title, COUNT(*) AS clicks
             FROM analytics a
             JOIN links l ON a.link_id = l.id
             WHERE a.user_id = ? AND a.event_type = ? AND a.created_at >= datetime('now', ?)
             GROUP BY a.link_id, l.title
             ORDER BY clicks DESC, a.link_id ASC",
        )
        .bind(user_id)
        .bind(EventType::LinkClick.as_str())
        .bind(&window)
        .fetch_all(&self.db)
        .await?;

        Ok(AnalyticsSummary {
            total_views,
            total_clicks,
            link_clicks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLink;
    use crate::repository::test_support::{create_test_user, test_db};
    use crate::repository::{LinkRepository, UserRepository};

    struct Fixture {
        _dir: tempfile::TempDir,
        db: Db,
        users: UserRepository,
        links: LinkRepository,
        analytics: AnalyticsRepository,
    }

    async fn setup() -> Fixture {
        let (dir, db) = test_db().await;
        Fixture {
            _dir: dir,
            users: UserRepository::new(db.clone()),
            links: LinkRepository::new(db.clone()),
            analytics: AnalyticsRepository::new(db.clone()),
            db,
        }
    }

    async fn create_link(links: &LinkRepository, user_id: i64, title: &str) -> i64 {
        links
            .create(&NewLink {
                user_id,
                title: title.to_string(),
                url: "https://example.com".to_string(),
                icon: None,
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let f = setup().await;
        let user = create_test_user(&f.users, "empty").await;

        let summary = f.analytics.get_summary(user.id, 7).await.unwrap();

        assert_eq!(summary.total_views, 0);
        assert_eq!(summary.total_clicks, 0);
        assert!(summary.link_clicks.is_empty());
    }

    #[tokio::test]
    async fn test_views_and_clicks_scenario() {
        let f = setup().await;
        let user = create_test_user(&f.users, "scenario").await;
        let link_id = create_link(&f.links, user.id, "Portfolio").await;

        for _ in 0..5 {
            f.analytics
                .record_page_view(user.id, "https://ref.example", "test-agent")
                .await
                .unwrap();
        }
        for _ in 0..3 {
            f.analytics
                .record_link_click(user.id, link_id, "", "test-agent")
                .await
                .unwrap();
        }

        let summary = f.analytics.get_summary(user.id, 7).await.unwrap();

        assert_eq!(summary.total_views, 5);
        assert_eq!(summary.total_clicks, 3);
        assert_eq!(
            summary.link_clicks,
            vec![LinkClickCount {
                link_id,
                title: "Portfolio".to_string(),
                clicks: 3,
            }]
        );
    }

    #[tokio::test]
    async fn test_link_clicks_sorted_by_count() {
        let f = setup().await;
        let user = create_test_user(&f.users, "sorted").await;
        let low = create_link(&f.links, user.id, "Low").await;
        let high = create_link(&f.links, user.id, "High").await;

        f.analytics.record_link_click(user.id, low, "", "").await.unwrap();
        for _ in 0..4 {
            f.analytics.record_link_click(user.id, high, "", "").await.unwrap();
        }

        let summary = f.analytics.get_summary(user.id, 28).await.unwrap();
        let order: Vec<(i64, i64)> = summary
            .link_clicks
            .iter()
            .map(|c| (c.link_id, c.clicks))
            .collect();
        assert_eq!(order, vec![(high, 4), (low, 1)]);
        assert_eq!(summary.total_clicks, 5);
    }

    #[tokio::test]
    async fn test_summary_uses_current_title() {
        let f = setup().await;
        let user = create_test_user(&f.users, "retitle").await;
        let link_id = create_link(&f.links, user.id, "Old Title").await;

        f.analytics.record_link_click(user.id, link_id, "", "").await.unwrap();

        let mut link = f.links.get_by_id(link_id).await.unwrap().unwrap();
        link.title = "New Title".to_string();
        f.links.update(&link).await.unwrap();

        let summary = f.analytics.get_summary(user.id, 7).await.unwrap();
        assert_eq!(summary.link_clicks[0].title, "New Title");
    }

    #[tokio::test]
    async fn test_events_outside_window_are_excluded() {
        let f = setup().await;
        let user = create_test_user(&f.users, "window").await;
        let link_id = create_link(&f.links, user.id, "Old").await;

        f.analytics.record_page_view(user.id, "", "").await.unwrap();

        sqlx::query(
            "INSERT INTO analytics (user_id, link_id, event_type, created_at)
             VALUES (?, ?, 'link_click', datetime('now', '-10 days')),
                    (?, NULL, 'page_view', datetime('now', '-10 days'))",
        )
        .bind(user.id)
        .bind(link_id)
        .bind(user.id)
        .execute(&f.db)
        .await
        .unwrap();

        let week = f.analytics.get_summary(user.id, 7).await.unwrap();
        assert_eq!(week.total_views, 1);
        assert_eq!(week.total_clicks, 0);
        assert!(week.link_clicks.is_empty());

        let month = f.analytics.get_summary(user.id, 30).await.unwrap();
        assert_eq!(month.total_views, 2);
        assert_eq!(month.total_clicks, 1);
    }

    #[tokio::test]
    async fn test_summary_is_per_user() {
        let f = setup().await;
        let alice = create_test_user(&f.users, "alice").await;
        let bob = create_test_user(&f.users, "bob").await;

        f.analytics.record_page_view(alice.id, "", "").await.unwrap();
        f.analytics.record_page_view(alice.id, "", "").await.unwrap();
        f.analytics.record_page_view(bob.id, "", "").await.unwrap();

        assert_eq!(f.analytics.get_summary(alice.id, 7).await.unwrap().total_views, 2);
        assert_eq!(f.analytics.get_summary(bob.id, 7).await.unwrap().total_views, 1);
    }

    #[tokio::test]
    async fn test_deleting_link_cascades_to_its_clicks() {
        let f = setup().await;
        let user = create_test_user(&f.users, "cascade").await;
        let link_id = create_link(&f.links, user.id, "Doomed").await;

        f.analytics.record_link_click(user.id, link_id, "", "").await.unwrap();
        f.links.delete(link_id).await.unwrap();

        let summary = f.analytics.get_summary(user.id, 7).await.unwrap();
        assert_eq!(summary.total_clicks, 0);
        assert!(summary.link_clicks.is_empty());
    }

    #[tokio::test]
    async fn test_click_for_missing_link_fails() {
        let f = setup().await;
        let user = create_test_user(&f.users, "fk").await;

        let result = f.analytics.record_link_click(user.id, 99999, "", "").await;
        assert!(result.is_err());
    }
}
