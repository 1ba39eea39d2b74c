use std::num::NonZeroUsize;

use async_trait::async_trait;
use netscope_application::NotificationSource;
use netscope_core::{AppError, AppResult};
use redis::AsyncCommands;
use serde_json::Value;
use tracing::warn;

/// Redis list adapter for the upstream notification bus.
///
/// The bridge from the provider event bus pushes raw notification JSON onto a
/// list; the ingestion worker drains it from the head. Requeued notifications
/// go to the tail so a persistently failing record cannot starve the queue.
#[derive(Clone)]
pub struct RedisNotificationSource {
    client: redis::Client,
    queue_key: String,
}

impl RedisNotificationSource {
    /// Creates a source reading from the given list key.
    #[must_use]
    pub fn new(client: redis::Client, queue_key: impl Into<String>) -> Self {
        Self {
            client,
            queue_key: queue_key.into(),
        }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!(
                    "failed to connect to notification bus: {error}"
                ))
            })
    }
}

#[async_trait]
impl NotificationSource for RedisNotificationSource {
    async fn pull(&self, max: usize) -> AppResult<Vec<Value>> {
        let Some(count) = NonZeroUsize::new(max) else {
            return Ok(Vec::new());
        };

        let mut connection = self.connection().await?;
        let raw_entries: Vec<String> = connection
            .lpop(self.queue_key.as_str(), Some(count))
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!(
                    "failed to pull from notification bus: {error}"
                ))
            })?;

        let mut notifications = Vec::with_capacity(raw_entries.len());
        for entry in raw_entries {
            match serde_json::from_str::<Value>(entry.as_str()) {
                Ok(notification) => notifications.push(notification),
                // Non-JSON bus entries are malformed input: dropped, not retried.
                Err(error) => warn!(%error, "dropping non-JSON bus notification"),
            }
        }

        Ok(notifications)
    }

    async fn requeue(&self, raw: Value) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .rpush(self.queue_key.as_str(), raw.to_string())
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!(
                    "failed to requeue bus notification: {error}"
                ))
            })
    }
}
