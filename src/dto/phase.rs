use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::{RoundPhase, SessionPhase};

/// Round phase exposed to clients (REST/SSE/WebSocket).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoundPhase {
    /// No session running.
    Idle,
    /// A new round is being announced.
    Announcing,
    /// Guesses are being collected.
    Collecting,
    /// The answer is being revealed.
    Revealing,
    /// Short pause before the next round.
    Cooldown,
    /// Final leaderboard is being published.
    Finished,
}

impl From<RoundPhase> for VisibleRoundPhase {
    fn from(value: RoundPhase) -> Self {
        match value {
            RoundPhase::Idle => VisibleRoundPhase::Idle,
            RoundPhase::Announcing => VisibleRoundPhase::Announcing,
            RoundPhase::Collecting => VisibleRoundPhase::Collecting,
            RoundPhase::Revealing => VisibleRoundPhase::Revealing,
            RoundPhase::Cooldown => VisibleRoundPhase::Cooldown,
            RoundPhase::Finished => VisibleRoundPhase::Finished,
        }
    }
}

/// Overall session phase exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleSessionPhase {
    /// No round announced yet.
    Idle,
    /// Rounds are being played.
    Running,
    /// Round limit reached, leaderboard published.
    Finished,
}

impl From<SessionPhase> for VisibleSessionPhase {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Idle => VisibleSessionPhase::Idle,
            SessionPhase::Running => VisibleSessionPhase::Running,
            SessionPhase::Finished => VisibleSessionPhase::Finished,
        }
    }
}
