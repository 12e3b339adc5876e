//! HTTP handlers for the events service.

pub mod events;
pub mod health;

pub use events::list_events;
pub use health::{health_check, readiness_check};
