use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::phase::VisibleRoundPhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "stopped").
    pub status: String,
    /// Number of playable songs in the catalog.
    pub catalog_size: usize,
    /// Phase of the round loop.
    pub phase: VisibleRoundPhase,
    /// Number of players in the room.
    pub players: usize,
}

impl HealthResponse {
    /// Create a health response for a running round loop.
    pub fn ok(catalog_size: usize, phase: VisibleRoundPhase, players: usize) -> Self {
        Self {
            status: "ok".to_string(),
            catalog_size,
            phase,
            players,
        }
    }

    /// Create a health response once the round loop has stopped.
    pub fn stopped(catalog_size: usize, phase: VisibleRoundPhase, players: usize) -> Self {
        Self {
            status: "stopped".to_string(),
            catalog_size,
            phase,
            players,
        }
    }
}
