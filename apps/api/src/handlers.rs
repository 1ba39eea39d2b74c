//! HTTP handlers for the read-only query boundary.

pub mod events;
pub mod health;
