//! Background writer for analytics events.
//!
//! Handlers enqueue events on a bounded channel and return immediately. A single
//! worker task owns an [`AnalyticsRepository`] and performs the inserts, so a
//! slow or failing write never delays or fails the request that produced it.
//! Events are dropped (with a warning) when the queue is full.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::constants::MAX_HEADER_VALUE_LEN;
use crate::repository::AnalyticsRepository;

/// A single analytics event waiting to be written
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    PageView {
        user_id: i64,
        referrer: String,
        user_agent: String,
    },
    LinkClick {
        user_id: i64,
        link_id: i64,
        referrer: String,
        user_agent: String,
    },
}

/// Cheap, cloneable producer side of the recorder
#[derive(Clone)]
pub struct AnalyticsRecorder {
    tx: mpsc::Sender<AnalyticsEvent>,
}

/// Owner of the worker task, used once at shutdown
pub struct RecorderHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    worker: JoinHandle<()>,
}

impl AnalyticsRecorder {
    /// Start the worker and return the producer plus its shutdown handle
    pub fn spawn(repo: AnalyticsRepository, capacity: usize) -> (Self, RecorderHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = tokio::spawn(run_worker(repo, rx, shutdown_rx));
        tracing::info!(capacity, "Analytics recorder started");

        (
            Self { tx },
            RecorderHandle {
                shutdown_tx: Some(shutdown_tx),
                worker,
            },
        )
    }

    pub fn record_page_view(&self, user_id: i64, referrer: &str, user_agent: &str) -> bool {
        self.enqueue(AnalyticsEvent::PageView {
            user_id,
            referrer: truncate(referrer, MAX_HEADER_VALUE_LEN),
            user_agent: truncate(user_agent, MAX_HEADER_VALUE_LEN),
        })
    }

    pub fn record_link_click(
        &self,
        user_id: i64,
        link_id: i64,
        referrer: &str,
        user_agent: &str,
    ) -> bool {
        self.enqueue(AnalyticsEvent::LinkClick {
            user_id,
            link_id,
            referrer: truncate(referrer, MAX_HEADER_VALUE_LEN),
            user_agent: truncate(user_agent, MAX_HEADER_VALUE_LEN),
        })
    }

    /// Queue an event without waiting. Returns false if it was dropped.
    fn enqueue(&self, event: AnalyticsEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(?event, "Analytics queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::warn!(?event, "Analytics recorder stopped, dropping event");
                false
            }
        }
    }
}

impl RecorderHandle {
    /// Stop accepting events and drain the queue within `grace`
    ///
    /// Returns true when every queued event was written (or failed on its
    /// own). On timeout the worker is aborted and the rest are dropped.
    pub async fn shutdown(mut self, grace: Duration) -> bool {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match tokio::time::timeout(grace, &mut self.worker).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Analytics recorder task failed: {}", e);
                false
            }
            Err(_) => {
                self.worker.abort();
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Analytics drain timed out, dropping remaining events"
                );
                false
            }
        }
    }
}

async fn run_worker(
    repo: AnalyticsRepository,
    mut rx: mpsc::Receiver<AnalyticsEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => write_event(&repo, event).await,
                None => return,
            },
            _ = &mut shutdown_rx => break,
        }
    }

    // Refuse new events, then flush whatever is already buffered
    rx.close();
    let mut drained = 0usize;
    while let Some(event) = rx.recv().await {
        write_event(&repo, event).await;
        drained += 1;
    }
    tracing::info!(drained, "Analytics recorder drained");
}

async fn write_event(repo: &AnalyticsRepository, event: AnalyticsEvent) {
    let result = match &event {
        AnalyticsEvent::PageView {
            user_id,
            referrer,
            user_agent,
        } => repo.record_page_view(*user_id, referrer, user_agent).await,
        AnalyticsEvent::LinkClick {
            user_id,
            link_id,
            referrer,
            user_agent,
        } => {
            repo.record_link_click(*user_id, *link_id, referrer, user_agent)
                .await
        }
    };

    if let Err(e) = result {
        tracing::error!(?event, "Failed to record analytics event: {}", e);
    }
}

/// Cut `value` to at most `max` bytes on a char boundary
fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLink;
    use crate::repository::test_support::{create_test_user, test_db};
    use crate::repository::{LinkRepository, UserRepository};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc");
        // 'é' is two bytes; never split it
        assert_eq!(truncate("aé", 2), "a");
        assert_eq!(truncate("", 0), "");
    }

    #[tokio::test]
    async fn test_full_queue_drops_event() {
        let (tx, _rx) = mpsc::channel(1);
        let recorder = AnalyticsRecorder { tx };

        assert!(recorder.record_page_view(1, "", ""));
        assert!(!recorder.record_page_view(1, "", ""));
    }

    #[tokio::test]
    async fn test_closed_queue_drops_event() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let recorder = AnalyticsRecorder { tx };

        assert!(!recorder.record_link_click(1, 2, "", ""));
    }

    #[tokio::test]
    async fn test_long_headers_are_truncated() {
        let (tx, mut rx) = mpsc::channel(1);
        let recorder = AnalyticsRecorder { tx };

        let long = "x".repeat(MAX_HEADER_VALUE_LEN * 2);
        recorder.record_page_view(7, &long, &long);

        match rx.recv().await.unwrap() {
            AnalyticsEvent::PageView {
                user_id,
                referrer,
                user_agent,
            } => {
                assert_eq!(user_id, 7);
                assert_eq!(referrer.len(), MAX_HEADER_VALUE_LEN);
                assert_eq!(user_agent.len(), MAX_HEADER_VALUE_LEN);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_events() {
        let (_dir, db) = test_db().await;
        let users = UserRepository::new(db.clone());
        let links = LinkRepository::new(db.clone());
        let analytics = AnalyticsRepository::new(db);

        let user = create_test_user(&users, "drain").await;
        let link = links
            .create(&NewLink {
                user_id: user.id,
                title: "Site".to_string(),
                url: "https://example.com".to_string(),
                icon: None,
                is_active: true,
            })
            .await
            .unwrap();

        let (recorder, handle) = AnalyticsRecorder::spawn(analytics.clone(), 64);
        for _ in 0..4 {
            assert!(recorder.record_page_view(user.id, "https://ref.example", "agent"));
        }
        for _ in 0..2 {
            assert!(recorder.record_link_click(user.id, link.id, "", "agent"));
        }

        assert!(handle.shutdown(Duration::from_secs(5)).await);

        let summary = analytics.get_summary(user.id, 7).await.unwrap();
        assert_eq!(summary.total_views, 4);
        assert_eq!(summary.total_clicks, 2);

        // Worker is gone; later events are refused
        assert!(!recorder.record_page_view(user.id, "", ""));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_worker() {
        let (_dir, db) = test_db().await;
        let users = UserRepository::new(db.clone());
        let analytics = AnalyticsRepository::new(db);
        let user = create_test_user(&users, "resilient").await;

        let (recorder, handle) = AnalyticsRecorder::spawn(analytics.clone(), 8);
        // Unknown link id violates the foreign key
        recorder.record_link_click(user.id, 99999, "", "");
        recorder.record_page_view(user.id, "", "");

        assert!(handle.shutdown(Duration::from_secs(5)).await);

        let summary = analytics.get_summary(user.id, 7).await.unwrap();
        assert_eq!(summary.total_views, 1);
        assert_eq!(summary.total_clicks, 0);
    }
}
