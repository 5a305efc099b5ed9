use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Events pushed to players and observers.
pub mod events;
/// Health endpoint payloads.
pub mod health;
/// Phase enums as exposed to clients.
pub mod phase;
/// Session, player and song projections.
pub mod session;
/// Input validation helpers.
pub mod validation;
/// Inbound player WebSocket messages.
pub mod ws;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
