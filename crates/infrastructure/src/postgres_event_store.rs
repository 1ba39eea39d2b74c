use async_trait::async_trait;
use chrono::{DateTime, Utc};
use netscope_application::{EventPage, EventRangeQuery, EventStore, IngestOutcome};
use netscope_core::{AppError, AppResult, EventScope};
use netscope_domain::{EventOrdering, PageCursor, ResourceEvent};
use sqlx::{FromRow, PgPool};


/// PostgreSQL-backed append-only event store.
///
/// Idempotency rides on the composite primary key: the insert is a single
/// `ON CONFLICT DO NOTHING` statement, so two racing writers with the same
/// identity resolve inside the engine with exactly one row stored.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    account_id: String,
    region: String,
    occurred_at: DateTime<Utc>,
    event_id: String,
    resource_id: String,
    service: String,
    detail_type: String,
    payload: serde_json::Value,
    schema_version: i16,
}

impl EventRow {
    fn into_event(self) -> AppResult<ResourceEvent> {
        let scope = EventScope::new(self.account_id, self.region)
            .map_err(|error| AppError::Internal(format!("corrupt stored scope: {error}")))?;

        ResourceEvent::new(
            scope,
            self.occurred_at,
            self.event_id,
            self.resource_id,
            self.service,
            self.detail_type,
            self.payload,
            u16::try_from(self.schema_version).unwrap_or_default(),
        )
        .map_err(|error| AppError::Internal(format!("corrupt stored event: {error}")))
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        account_id,
        region,
        occurred_at,
        event_id,
        resource_id,
        service,
        detail_type,
        payload,
        schema_version
    FROM resource_events
"#;

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert_if_absent(&self, event: ResourceEvent) -> AppResult<IngestOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO resource_events (
                account_id,
                region,
                occurred_at,
                event_id,
                resource_id,
                service,
                detail_type,
                payload,
                schema_version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (account_id, region, occurred_at, event_id) DO NOTHING
            "#,
        )
        .bind(event.scope().account_id())
        .bind(event.scope().region())
        .bind(event.occurred_at())
        .bind(event.event_id())
        .bind(event.resource_id())
        .bind(event.service())
        .bind(event.detail_type())
        .bind(event.payload())
        .bind(i16::try_from(event.schema_version()).map_err(|error| {
            AppError::Internal(format!("schema version out of range: {error}"))
        })?)
        .execute(&self.pool)
        .await
        .map_err(|error| map_storage_error("failed to insert event", error))?;

        if result.rows_affected() == 1 {
            Ok(IngestOutcome::Accepted)
        } else {
            Ok(IngestOutcome::Deduplicated)
        }
    }

    async fn list_events(
        &self,
        scope: &EventScope,
        query: EventRangeQuery,
    ) -> AppResult<EventPage> {
        let (sql, key_value) = match &query.ordering {
            EventOrdering::ByScope => (
                format!(
                    "{SELECT_COLUMNS}
                    WHERE account_id = $1
                        AND region = $2
                        AND ($3::TIMESTAMPTZ IS NULL OR (occurred_at, event_id) > ($3, $4))
                    ORDER BY occurred_at, event_id
                    LIMIT $5"
                ),
                None,
            ),
            EventOrdering::ByResource(resource_id) => (
                format!(
                    "{SELECT_COLUMNS}
                    WHERE account_id = $1
                        AND region = $2
                        AND resource_id = $6
                        AND ($3::TIMESTAMPTZ IS NULL OR (occurred_at, event_id) > ($3, $4))
                    ORDER BY occurred_at, event_id
                    LIMIT $5"
                ),
                Some(resource_id.clone()),
            ),
            EventOrdering::ByService(service) => (
                format!(
                    "{SELECT_COLUMNS}
                    WHERE account_id = $1
                        AND region = $2
                        AND service = $6
                        AND ($3::TIMESTAMPTZ IS NULL OR (occurred_at, event_id) > ($3, $4))
                    ORDER BY occurred_at, event_id
                    LIMIT $5"
                ),
                Some(service.clone()),
            ),
        };

        // One row beyond the page decides whether a resume cursor is needed.
        let fetch_limit = i64::from(query.limit).saturating_add(1);
        let cursor_time = query.after.as_ref().map(PageCursor::occurred_at);
        let cursor_event_id = query.after.as_ref().map(|after| after.event_id().to_owned());

        let mut statement = sqlx::query_as::<_, EventRow>(sql.as_str())
            .bind(scope.account_id())
            .bind(scope.region())
            .bind(cursor_time)
            .bind(cursor_event_id)
            .bind(fetch_limit);
        if let Some(key_value) = key_value {
            statement = statement.bind(key_value);
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(|error| map_storage_error("failed to list events", error))?;

        let has_more = rows.len() > query.limit as usize;
        let mut events = rows
            .into_iter()
            .map(EventRow::into_event)
            .collect::<AppResult<Vec<ResourceEvent>>>()?;
        events.truncate(query.limit as usize);

        let next_cursor = if has_more {
            events
                .last()
                .map(|event| PageCursor::new(event.occurred_at(), event.event_id()))
        } else {
            None
        };

        Ok(EventPage {
            events,
            next_cursor,
        })
    }

    async fn find_event(
        &self,
        scope: &EventScope,
        event_id: &str,
    ) -> AppResult<Option<ResourceEvent>> {
        // An event_id may recur at different timestamps within a scope; the
        // lookup pins the earliest occurrence so repeated calls agree.
        let sql = format!(
            "{SELECT_COLUMNS}
            WHERE account_id = $1
                AND region = $2
                AND event_id = $3
            ORDER BY occurred_at, event_id
            LIMIT 1"
        );

        let row = sqlx::query_as::<_, EventRow>(sql.as_str())
            .bind(scope.account_id())
            .bind(scope.region())
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| map_storage_error("failed to find event", error))?;

        row.map(EventRow::into_event).transpose()
    }
}

fn map_storage_error(context: &str, error: sqlx::Error) -> AppError {
    let transient = match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(database_error) => database_error
            .code()
            .is_some_and(|code| is_transient_sqlstate(code.as_ref())),
        _ => false,
    };

    if transient {
        AppError::StorageUnavailable(format!("{context}: {error}"))
    } else {
        AppError::Internal(format!("{context}: {error}"))
    }
}

/// SQLSTATE classes that signal a retryable engine condition rather than a
/// bug: 08 (connection exception), 53 (insufficient resources, e.g.
/// `too_many_connections`), 57 (operator intervention, e.g.
/// `cannot_connect_now` during restart), plus serialization failures and
/// deadlocks. Callers retry these; idempotent ingestion makes that safe.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || code.starts_with("57")
        || code == "40001"
        || code == "40P01"
}
