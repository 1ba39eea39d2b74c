//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_event_store;
mod redis_notification_source;

pub use postgres_event_store::PostgresEventStore;
pub use redis_notification_source::RedisNotificationSource;
