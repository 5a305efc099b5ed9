use serde::Serialize;
use tokio::time::Instant;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        format_system_time,
        phase::{VisibleRoundPhase, VisibleSessionPhase},
    },
    state::{
        game::{Artist, GameSession, Player, Round, Song},
        state_machine::RoundPhase,
    },
};

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
/// Public projection of a player exposed to clients.
pub struct PlayerSummary {
    /// Player identity, used to reconnect.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Points earned in the current session.
    pub score: u32,
}

/// Artist details attached to a revealed song.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct ArtistSummary {
    /// Display name.
    pub name: String,
    /// Picture URI.
    pub picture: String,
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
/// Full song details, only sent once the answer is revealed.
pub struct SongSummary {
    /// Provider track identifier.
    pub id: u64,
    /// Preview audio URI.
    pub preview: String,
    /// Song title.
    pub title: String,
    /// Credited artist.
    pub artist: ArtistSummary,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Current round as seen by clients.
pub struct RoundSnapshot {
    /// Round number within the session.
    pub number: u32,
    /// Phase of the round.
    pub phase: VisibleRoundPhase,
    /// Preview URI of the song being played.
    pub preview: String,
    /// RFC 3339 timestamp of the round opening.
    pub started_at: String,
    /// Milliseconds left in the collecting window.
    pub remaining_ms: u64,
    /// Present once the answer has been revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SongSummary>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Self-consistent view of the whole session.
pub struct SessionSnapshot {
    /// Session lifecycle phase.
    pub phase: VisibleSessionPhase,
    /// Phase of the current round, `idle` between sessions.
    pub round_phase: VisibleRoundPhase,
    /// Roster in join order.
    pub players: Vec<PlayerSummary>,
    /// Current round, absent before the first announcement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundSnapshot>,
    /// Songs revealed so far in this session.
    pub history: Vec<SongSummary>,
}

/// Players ranked by score, ties kept in join order.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Ranked players.
    pub players: Vec<PlayerSummary>,
}

impl From<Vec<Player>> for LeaderboardResponse {
    fn from(players: Vec<Player>) -> Self {
        Self {
            players: players.iter().map(PlayerSummary::from).collect(),
        }
    }
}

impl SessionSnapshot {
    /// Capture the session as of `now`.
    pub fn capture(session: &GameSession, now: Instant) -> Self {
        let phase = session.phase();
        Self {
            phase: session.session_phase().into(),
            round_phase: phase.into(),
            players: session.players.values().map(PlayerSummary::from).collect(),
            round: session
                .current_round
                .as_ref()
                .map(|round| RoundSnapshot::capture(round, phase, now)),
            history: session.history.iter().map(SongSummary::from).collect(),
        }
    }
}

impl RoundSnapshot {
    /// Project a round, withholding the answer until it has been revealed.
    pub fn capture(round: &Round, phase: RoundPhase, now: Instant) -> Self {
        let revealed = matches!(
            phase,
            RoundPhase::Revealing | RoundPhase::Cooldown | RoundPhase::Finished
        );
        let remaining_ms = if phase == RoundPhase::Collecting {
            u64::try_from(round.remaining(now).as_millis()).unwrap_or(u64::MAX)
        } else {
            0
        };

        Self {
            number: round.number,
            phase: phase.into(),
            preview: round.song.preview.clone(),
            started_at: format_system_time(round.started_at),
            remaining_ms,
            song: revealed.then(|| SongSummary::from(&round.song)),
        }
    }
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            score: player.score,
        }
    }
}

impl From<&Artist> for ArtistSummary {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            picture: artist.picture.clone(),
        }
    }
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            preview: song.preview.clone(),
            title: song.title.clone(),
            artist: (&song.artist).into(),
        }
    }
}
