use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChannelKind, MatchNotification, StandingSearch};

/// Errors from the notification path. These are operational signals; they
/// never propagate back to the profile-write event source.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification store failed: {0}")]
    StoreFailed(String),

    #[error("Delivery failed on {channel}: {reason}")]
    DeliveryFailed { channel: &'static str, reason: String },
}

/// Per-channel delivery failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Outcome of a notify call. `Duplicate` is the expected result of a
/// repeated match attempt, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Created { channels: Vec<ChannelKind> },
    Duplicate,
}

/// Storage for MatchNotification rows. The uniqueness of
/// (standing_search_id, candidate_profile_id) lives here, at the storage
/// layer, so concurrent evaluators racing on the same pair cannot both
/// create a row.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert under the uniqueness constraint. `Ok(None)` means the pair
    /// already exists (the idempotency boundary).
    async fn try_insert(
        &self,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<Option<MatchNotification>, NotifyError>;

    async fn find(
        &self,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<Option<MatchNotification>, NotifyError>;

    /// Record which channels have actually succeeded so far.
    async fn set_channels(&self, id: Uuid, channels: &[ChannelKind]) -> Result<(), NotifyError>;
}

/// A single delivery channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn deliver(
        &self,
        recipient_contact: &str,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<(), SinkError>;
}

/// Postgres-backed notification store.
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn try_insert(
        &self,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<Option<MatchNotification>, NotifyError> {
        let query = r#"
            INSERT INTO match_notifications (id, standing_search_id, candidate_profile_id, channels, sent_at)
            VALUES ($1, $2, $3, '{}', NOW())
            ON CONFLICT (standing_search_id, candidate_profile_id) DO NOTHING
            RETURNING id, sent_at
        "#;

        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(standing_search_id)
            .bind(candidate_profile_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| NotifyError::StoreFailed(e.to_string()))?;

        Ok(row.map(|row| MatchNotification {
            id: row.get("id"),
            standing_search_id,
            candidate_profile_id: candidate_profile_id.to_string(),
            channels: vec![],
            sent_at: row.get("sent_at"),
        }))
    }

    async fn find(
        &self,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<Option<MatchNotification>, NotifyError> {
        let query = r#"
            SELECT id, channels, sent_at
            FROM match_notifications
            WHERE standing_search_id = $1 AND candidate_profile_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(standing_search_id)
            .bind(candidate_profile_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| NotifyError::StoreFailed(e.to_string()))?;

        Ok(row.map(|row| {
            let channels_raw: Vec<String> = row.get("channels");
            MatchNotification {
                id: row.get("id"),
                standing_search_id,
                candidate_profile_id: candidate_profile_id.to_string(),
                channels: channels_raw
                    .iter()
                    .filter_map(|c| ChannelKind::parse(c))
                    .collect(),
                sent_at: row.get("sent_at"),
            }
        }))
    }

    async fn set_channels(&self, id: Uuid, channels: &[ChannelKind]) -> Result<(), NotifyError> {
        let channels_raw: Vec<String> = channels.iter().map(|c| c.as_str().to_string()).collect();

        sqlx::query("UPDATE match_notifications SET channels = $2 WHERE id = $1")
            .bind(id)
            .bind(&channels_raw)
            .execute(&self.pool)
            .await
            .map_err(|e| NotifyError::StoreFailed(e.to_string()))?;

        Ok(())
    }
}

/// In-platform inbox sink, backed by the inbox_messages table.
pub struct InboxSink {
    pool: PgPool,
}

impl InboxSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for InboxSink {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Inbox
    }

    async fn deliver(
        &self,
        recipient_contact: &str,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<(), SinkError> {
        sqlx::query(
            r#"
            INSERT INTO inbox_messages (id, recipient_contact, standing_search_id, candidate_profile_id, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient_contact)
        .bind(standing_search_id)
        .bind(candidate_profile_id)
        .execute(&self.pool)
        .await
        .map_err(|e| SinkError(e.to_string()))?;

        Ok(())
    }
}

/// Email sink: hands the notification to the external delivery endpoint.
pub struct EmailSink {
    client: reqwest::Client,
    endpoint: String,
}

impl EmailSink {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(
        &self,
        recipient_contact: &str,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "recipientContact": recipient_contact,
                "standingSearchId": standing_search_id,
                "candidateProfileId": candidate_profile_id,
            }))
            .send()
            .await
            .map_err(|e| SinkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError(format!(
                "Email delivery failed: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Idempotent, multi-channel match notification dispatch.
///
/// The MatchNotification row is the idempotency boundary: it is created
/// once per (standing search, candidate) pair and never rolled back, even
/// when every delivery attempt ultimately fails. Channels are delivered
/// independently with bounded exponential backoff; the row records the
/// channels that actually succeeded.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    max_attempts: u32,
    base_backoff: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        sinks: Vec<Arc<dyn NotificationSink>>,
        max_attempts: u32,
        base_backoff: Duration,
    ) -> Self {
        Self {
            store,
            sinks,
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Notify the standing search's requester about a matching candidate.
    /// Safe to call any number of times for the same pair.
    pub async fn notify(
        &self,
        search: &StandingSearch,
        candidate_profile_id: &str,
    ) -> Result<NotifyOutcome, NotifyError> {
        let inserted = self.store.try_insert(search.id, candidate_profile_id).await?;

        let Some(notification) = inserted else {
            tracing::debug!(
                "Duplicate suppressed: search {} already notified about {}",
                search.id,
                candidate_profile_id
            );
            return Ok(NotifyOutcome::Duplicate);
        };

        let delivered = self
            .deliver_all(&search.requester_contact, search.id, candidate_profile_id, &[])
            .await;

        if !delivered.is_empty() {
            self.store.set_channels(notification.id, &delivered).await?;
        }

        tracing::info!(
            "Notified search {} about candidate {} via {:?}",
            search.id,
            candidate_profile_id,
            delivered
        );

        Ok(NotifyOutcome::Created { channels: delivered })
    }

    /// Re-attempt only the channels missing from the recorded set.
    /// Extends the existing row; never inserts a second one. Returns the
    /// full channel set after the retry.
    pub async fn retry_failed_channels(
        &self,
        search: &StandingSearch,
        candidate_profile_id: &str,
    ) -> Result<Vec<ChannelKind>, NotifyError> {
        let Some(notification) = self.store.find(search.id, candidate_profile_id).await? else {
            // Nothing was ever recorded for this pair; retry is a no-op.
            return Ok(vec![]);
        };

        let newly_delivered = self
            .deliver_all(
                &search.requester_contact,
                search.id,
                candidate_profile_id,
                &notification.channels,
            )
            .await;

        if newly_delivered.is_empty() {
            return Ok(notification.channels);
        }

        let mut channels = notification.channels;
        channels.extend(newly_delivered);
        self.store.set_channels(notification.id, &channels).await?;

        Ok(channels)
    }

    /// Deliver through every configured sink not in `skip`, each channel
    /// independent of the others. Returns the channels that succeeded.
    async fn deliver_all(
        &self,
        recipient_contact: &str,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
        skip: &[ChannelKind],
    ) -> Vec<ChannelKind> {
        let mut delivered = Vec::new();

        for sink in &self.sinks {
            if skip.contains(&sink.kind()) {
                continue;
            }

            match self
                .deliver_with_backoff(sink.as_ref(), recipient_contact, standing_search_id, candidate_profile_id)
                .await
            {
                Ok(()) => delivered.push(sink.kind()),
                Err(e) => {
                    // Terminal for this channel; the row stays and the
                    // channel can be retried later.
                    tracing::error!(
                        "Delivery failed on {} for search {} candidate {} after {} attempts: {}",
                        sink.kind().as_str(),
                        standing_search_id,
                        candidate_profile_id,
                        self.max_attempts,
                        e
                    );
                }
            }
        }

        delivered
    }

    async fn deliver_with_backoff(
        &self,
        sink: &dyn NotificationSink,
        recipient_contact: &str,
        standing_search_id: Uuid,
        candidate_profile_id: &str,
    ) -> Result<(), SinkError> {
        let mut delay = self.base_backoff;

        for attempt in 1..=self.max_attempts {
            match sink
                .deliver(recipient_contact, standing_search_id, candidate_profile_id)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Delivery attempt {}/{} on {} failed, retrying in {:?}: {}",
                        attempt,
                        self.max_attempts,
                        sink.kind().as_str(),
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }

        unreachable!("delivery loop always returns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criteria, RequesterKind, SearchStatus};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct MemoryStore {
        rows: Mutex<HashMap<(Uuid, String), MatchNotification>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationStore for MemoryStore {
        async fn try_insert(
            &self,
            standing_search_id: Uuid,
            candidate_profile_id: &str,
        ) -> Result<Option<MatchNotification>, NotifyError> {
            let mut rows = self.rows.lock().unwrap();
            let key = (standing_search_id, candidate_profile_id.to_string());
            if rows.contains_key(&key) {
                return Ok(None);
            }
            let notification = MatchNotification {
                id: Uuid::new_v4(),
                standing_search_id,
                candidate_profile_id: candidate_profile_id.to_string(),
                channels: vec![],
                sent_at: chrono::Utc::now(),
            };
            rows.insert(key, notification.clone());
            Ok(Some(notification))
        }

        async fn find(
            &self,
            standing_search_id: Uuid,
            candidate_profile_id: &str,
        ) -> Result<Option<MatchNotification>, NotifyError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .get(&(standing_search_id, candidate_profile_id.to_string()))
                .cloned())
        }

        async fn set_channels(&self, id: Uuid, channels: &[ChannelKind]) -> Result<(), NotifyError> {
            let mut rows = self.rows.lock().unwrap();
            for notification in rows.values_mut() {
                if notification.id == id {
                    notification.channels = channels.to_vec();
                }
            }
            Ok(())
        }
    }

    /// Fails the first `failures` deliveries, then succeeds.
    struct FlakySink {
        kind: ChannelKind,
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl NotificationSink for FlakySink {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn deliver(&self, _: &str, _: Uuid, _: &str) -> Result<(), SinkError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SinkError("transient".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn test_search() -> StandingSearch {
        StandingSearch {
            id: Uuid::new_v4(),
            requester_id: "coach-1".to_string(),
            requester_kind: RequesterKind::Coach,
            requester_contact: "coach@club.example".to_string(),
            description_text: "pivô".to_string(),
            criteria: Criteria::default(),
            status: SearchStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn dispatcher(store: Arc<MemoryStore>, sinks: Vec<Arc<dyn NotificationSink>>) -> NotificationDispatcher {
        NotificationDispatcher::new(store, sinks, 3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_notify_then_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(FlakySink {
            kind: ChannelKind::Inbox,
            failures: 0,
            calls: AtomicU32::new(0),
        });
        let dispatcher = dispatcher(Arc::clone(&store), vec![sink]);
        let search = test_search();

        let first = dispatcher.notify(&search, "athlete-1").await.unwrap();
        assert_eq!(first, NotifyOutcome::Created { channels: vec![ChannelKind::Inbox] });

        let second = dispatcher.notify(&search, "athlete-1").await.unwrap();
        assert_eq!(second, NotifyOutcome::Duplicate);

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_with_backoff() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(FlakySink {
            kind: ChannelKind::Inbox,
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let dispatcher = dispatcher(Arc::clone(&store), vec![Arc::clone(&sink) as Arc<dyn NotificationSink>]);
        let search = test_search();

        let outcome = dispatcher.notify(&search, "athlete-1").await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Created { channels: vec![ChannelKind::Inbox] });
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_channel_failure_recorded_and_row_kept() {
        let store = Arc::new(MemoryStore::new());
        let inbox = Arc::new(FlakySink {
            kind: ChannelKind::Inbox,
            failures: 0,
            calls: AtomicU32::new(0),
        });
        let email = Arc::new(FlakySink {
            kind: ChannelKind::Email,
            failures: 10, // never succeeds within max_attempts
            calls: AtomicU32::new(0),
        });
        let dispatcher = dispatcher(
            Arc::clone(&store),
            vec![inbox, Arc::clone(&email) as Arc<dyn NotificationSink>],
        );
        let search = test_search();

        let outcome = dispatcher.notify(&search, "athlete-1").await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Created { channels: vec![ChannelKind::Inbox] });
        // The row exists despite the email failure.
        assert_eq!(store.len(), 1);
        let row = store.find(search.id, "athlete-1").await.unwrap().unwrap();
        assert_eq!(row.channels, vec![ChannelKind::Inbox]);
    }

    #[tokio::test]
    async fn test_retry_extends_channels_without_second_row() {
        let store = Arc::new(MemoryStore::new());
        // Email fails through the first notify (3 attempts), then recovers.
        let email = Arc::new(FlakySink {
            kind: ChannelKind::Email,
            failures: 3,
            calls: AtomicU32::new(0),
        });
        let inbox = Arc::new(FlakySink {
            kind: ChannelKind::Inbox,
            failures: 0,
            calls: AtomicU32::new(0),
        });
        let dispatcher = dispatcher(
            Arc::clone(&store),
            vec![Arc::clone(&inbox) as Arc<dyn NotificationSink>, Arc::clone(&email) as Arc<dyn NotificationSink>],
        );
        let search = test_search();

        dispatcher.notify(&search, "athlete-1").await.unwrap();
        let inbox_calls_after_notify = inbox.calls.load(Ordering::SeqCst);

        let channels = dispatcher.retry_failed_channels(&search, "athlete-1").await.unwrap();

        assert_eq!(channels, vec![ChannelKind::Inbox, ChannelKind::Email]);
        assert_eq!(store.len(), 1);
        // The already-delivered inbox channel was not re-sent.
        assert_eq!(inbox.calls.load(Ordering::SeqCst), inbox_calls_after_notify);
    }

    #[tokio::test]
    async fn test_retry_without_row_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(Arc::clone(&store), vec![]);
        let search = test_search();

        let channels = dispatcher.retry_failed_channels(&search, "athlete-1").await.unwrap();

        assert!(channels.is_empty());
        assert_eq!(store.len(), 0);
    }
}
