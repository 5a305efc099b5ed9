use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::session::{PlayerSummary, SessionSnapshot, SongSummary};

/// Every message the server pushes to players and spectators.
///
/// Serialised as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Room-wide: a new round started, only the preview is disclosed.
    RoundStarted(RoundStartedEvent),
    /// To the guesser: the artist was found.
    ArtistGuessed(ArtistGuessedEvent),
    /// To the guesser: the title was found.
    SongGuessed(SongGuessedEvent),
    /// Room-wide: scores or roster changed.
    SessionUpdated(SessionUpdatedEvent),
    /// Room-wide: the collecting window closed, here is the answer.
    RoundRevealed(RoundRevealedEvent),
    /// Room-wide: the round limit was reached.
    SessionFinished(SessionFinishedEvent),
    /// To the caller: reply to a join or reconnect.
    Joined(JoinedEvent),
    /// To the caller: the last message was rejected.
    Error(ErrorEvent),
}

impl SessionEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RoundStarted(_) => "round_started",
            SessionEvent::ArtistGuessed(_) => "artist_guessed",
            SessionEvent::SongGuessed(_) => "song_guessed",
            SessionEvent::SessionUpdated(_) => "session_updated",
            SessionEvent::RoundRevealed(_) => "round_revealed",
            SessionEvent::SessionFinished(_) => "session_finished",
            SessionEvent::Joined(_) => "joined",
            SessionEvent::Error(_) => "error",
        }
    }

    /// Serialise only the payload, used as SSE `data` next to the event name.
    pub fn data_json(&self) -> serde_json::Result<String> {
        match self {
            SessionEvent::RoundStarted(payload) => serde_json::to_string(payload),
            SessionEvent::ArtistGuessed(payload) => serde_json::to_string(payload),
            SessionEvent::SongGuessed(payload) => serde_json::to_string(payload),
            SessionEvent::SessionUpdated(payload) => serde_json::to_string(payload),
            SessionEvent::RoundRevealed(payload) => serde_json::to_string(payload),
            SessionEvent::SessionFinished(payload) => serde_json::to_string(payload),
            SessionEvent::Joined(payload) => serde_json::to_string(payload),
            SessionEvent::Error(payload) => serde_json::to_string(payload),
        }
    }
}

/// Payload of `roundStarted`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundStartedEvent {
    /// Round number within the session, starting at 1.
    pub round: u32,
    /// Preview audio URI to play.
    pub preview: String,
    /// Length of the collecting window in milliseconds.
    pub duration_ms: u64,
}

/// Payload of `artistGuessed`, sent only to the guessing player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArtistGuessedEvent {
    /// Artist display name.
    pub name: String,
    /// Artist picture URI.
    pub picture: String,
}

/// Payload of `songGuessed`, sent only to the guessing player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SongGuessedEvent {
    /// Song title.
    pub title: String,
}

/// Payload of `sessionUpdated`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionUpdatedEvent {
    /// Public view of the session after the change.
    pub session: SessionSnapshot,
}

/// Payload of `roundRevealed`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundRevealedEvent {
    /// Round that just closed.
    pub round: u32,
    /// Song that was playing.
    pub song: SongSummary,
}

/// Payload of `sessionFinished`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionFinishedEvent {
    /// Final ranking, best score first.
    pub leaderboard: Vec<PlayerSummary>,
}

/// Reply to `join` and `reconnect`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinedEvent {
    /// Current public view of the session.
    pub session: SessionSnapshot,
    /// The player the socket now represents.
    pub player: PlayerSummary,
}

/// Payload of `error`, sent to the offending socket only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorEvent {
    /// Human readable reason.
    pub message: String,
}
