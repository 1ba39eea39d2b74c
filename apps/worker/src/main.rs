//! Netscope ingestion worker runtime.
//!
//! Drains raw lifecycle notifications from the upstream bus and feeds them
//! through the idempotent ingestion service. The bus delivers at-least-once,
//! so redelivered notifications resolve to `Deduplicated` rather than
//! duplicate rows; a transient storage failure puts the notification back on
//! the bus for a later attempt.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use netscope_application::{EventIngestionService, IngestOutcome, NotificationSource};
use netscope_core::{AppError, AppResult};
use netscope_infrastructure::{PostgresEventStore, RedisNotificationSource};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    redis_url: String,
    queue_key: String,
    pull_batch_size: usize,
    poll_interval_ms: u64,
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            redis_url: required_env("REDIS_URL")?,
            queue_key: env::var("EVENT_QUEUE_KEY")
                .unwrap_or_else(|_| "netscope:events:incoming".to_owned()),
            pull_batch_size: env::var("PULL_BATCH_SIZE")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(25),
            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(2_000),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    let redis_client = redis::Client::open(config.redis_url.as_str())
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
    let source = RedisNotificationSource::new(redis_client, config.queue_key.clone());

    let ingestion_service = EventIngestionService::new(Arc::new(PostgresEventStore::new(pool)));

    info!(
        queue_key = %config.queue_key,
        pull_batch_size = config.pull_batch_size,
        poll_interval_ms = config.poll_interval_ms,
        "netscope-worker started"
    );

    loop {
        let notifications = match source.pull(config.pull_batch_size).await {
            Ok(notifications) => notifications,
            Err(error) => {
                warn!(%error, "failed to pull from notification bus");
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                continue;
            }
        };

        if notifications.is_empty() {
            tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
            continue;
        }

        let mut accepted = 0_u32;
        let mut deduplicated = 0_u32;
        let mut dropped = 0_u32;

        for raw in notifications {
            match ingestion_service.ingest(raw.clone()).await {
                Ok(IngestOutcome::Accepted) => accepted += 1,
                Ok(IngestOutcome::Deduplicated) => deduplicated += 1,
                Err(AppError::MalformedEvent(reason)) => {
                    // Fail fast, no retry: upstream owns malformed input.
                    dropped += 1;
                    warn!(%reason, "dropped malformed notification");
                }
                Err(AppError::StorageUnavailable(reason)) => {
                    warn!(%reason, "storage unavailable, requeueing notification");
                    if let Err(error) = source.requeue(raw).await {
                        warn!(%error, "failed to requeue notification, it will be lost");
                    }
                    tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                }
                Err(error) => {
                    dropped += 1;
                    warn!(%error, "failed to ingest notification");
                }
            }
        }

        info!(accepted, deduplicated, dropped, "processed notification batch");
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
