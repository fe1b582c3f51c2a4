use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::constants::{DASHBOARD_SUMMARY_DAYS, MAX_SUMMARY_DAYS};
use crate::error::{AppError, Result};
use crate::models::{AnalyticsSummary, Link, User};
use crate::routes::CurrentUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub links: Vec<Link>,
    /// `None` when the summary could not be computed
    pub analytics: Option<AnalyticsSummary>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

/// Clamp a requested window into `1..=MAX_SUMMARY_DAYS`, defaulting to the dashboard window
fn summary_window(days: Option<i64>) -> u32 {
    match days {
        Some(days) => days.clamp(1, i64::from(MAX_SUMMARY_DAYS)) as u32,
        None => DASHBOARD_SUMMARY_DAYS,
    }
}

/// Owner view: account, every link (active or not) and recent analytics
///
/// Analytics failures degrade to `null` rather than failing the page.
pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DashboardResponse>> {
    let user = state
        .users
        .get_by_id(current.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let links = state.links.get_by_user_id(current.user_id).await?;

    let analytics = match state
        .analytics
        .get_summary(current.user_id, DASHBOARD_SUMMARY_DAYS)
        .await
    {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::error!(user_id = current.user_id, "Analytics summary failed: {}", e);
            None
        }
    };

    tracing::debug!(user_id = current.user_id, links = links.len(), "Dashboard loaded");

    Ok(Json(DashboardResponse {
        user,
        links,
        analytics,
    }))
}

/// Analytics summary over `?days=N` (default 28)
pub async fn analytics_summary(
    State(state): State<AppState>,
    current: CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<AnalyticsQuery>, AppError>,
) -> Result<Json<AnalyticsSummary>> {
    let days = summary_window(query.days);
    let summary = state.analytics.get_summary(current.user_id, days).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_window() {
        assert_eq!(summary_window(None), DASHBOARD_SUMMARY_DAYS);
        assert_eq!(summary_window(Some(7)), 7);
        assert_eq!(summary_window(Some(0)), 1);
        assert_eq!(summary_window(Some(-5)), 1);
        assert_eq!(summary_window(Some(10_000)), MAX_SUMMARY_DAYS);
    }
}
