use serde::Serialize;

/// Kind of analytics event stored in the `event_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    LinkClick,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::LinkClick => "link_click",
        }
    }
}

/// Aggregated analytics over a trailing window of days
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub total_clicks: i64,
    pub link_clicks: Vec<LinkClickCount>,
}

/// Click count for one link, with its current title
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LinkClickCount {
    pub link_id: i64,
    pub title: String,
    pub clicks: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_str() {
        assert_eq!(EventType::PageView.as_str(), "page_view");
        assert_eq!(EventType::LinkClick.as_str(), "link_click");
    }

    #[test]
    fn test_empty_summary_serializes_empty_list() {
        let value = serde_json::to_value(AnalyticsSummary::default()).unwrap();
        assert_eq!(value["total_views"], 0);
        assert_eq!(value["total_clicks"], 0);
        assert_eq!(value["link_clicks"], serde_json::json!([]));
    }
}
