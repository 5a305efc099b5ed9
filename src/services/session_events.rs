use std::fmt::Display;

use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    dto::{
        events::{
            ArtistGuessedEvent, ErrorEvent, JoinedEvent, RoundRevealedEvent, RoundStartedEvent,
            SessionEvent, SessionFinishedEvent, SessionUpdatedEvent, SongGuessedEvent,
        },
        session::{PlayerSummary, SessionSnapshot, SongSummary},
    },
    state::{
        SharedState,
        game::{Artist, GameSession, Player, Round, Song},
    },
};

/// Announce a new round to the room, disclosing only the preview.
pub fn broadcast_round_started(state: &SharedState, round: &Round) {
    let payload = RoundStartedEvent {
        round: round.number,
        preview: round.song.preview.clone(),
        duration_ms: u64::try_from(round.window().as_millis()).unwrap_or(u64::MAX),
    };
    state
        .broadcaster()
        .broadcast_to_room(SessionEvent::RoundStarted(payload));
}

/// Tell a player they found the artist.
pub fn send_artist_guessed(state: &SharedState, player_id: &Uuid, artist: &Artist) {
    let payload = ArtistGuessedEvent {
        name: artist.name.clone(),
        picture: artist.picture.clone(),
    };
    state
        .broadcaster()
        .send_to_player(player_id, SessionEvent::ArtistGuessed(payload));
}

/// Tell a player they found the title.
pub fn send_song_guessed(state: &SharedState, player_id: &Uuid, title: &str) {
    let payload = SongGuessedEvent {
        title: title.to_string(),
    };
    state
        .broadcaster()
        .send_to_player(player_id, SessionEvent::SongGuessed(payload));
}

/// Broadcast a snapshot of the whole session after scores or roster changed.
pub fn broadcast_session_updated(state: &SharedState, session: &GameSession) {
    let payload = SessionUpdatedEvent {
        session: SessionSnapshot::capture(session, Instant::now()),
    };
    state
        .broadcaster()
        .broadcast_to_room(SessionEvent::SessionUpdated(payload));
}

/// Reveal the answer of a finished round.
pub fn broadcast_round_revealed(state: &SharedState, round: u32, song: &Song) {
    let payload = RoundRevealedEvent {
        round,
        song: SongSummary::from(song),
    };
    state
        .broadcaster()
        .broadcast_to_room(SessionEvent::RoundRevealed(payload));
}

/// Publish the final leaderboard of a session.
pub fn broadcast_session_finished(state: &SharedState, leaderboard: &[Player]) {
    let payload = SessionFinishedEvent {
        leaderboard: leaderboard.iter().map(PlayerSummary::from).collect(),
    };
    state
        .broadcaster()
        .broadcast_to_room(SessionEvent::SessionFinished(payload));
}

/// Reply sent to a socket that joined or reconnected.
pub fn joined_reply(session: &GameSession, player: &Player) -> JoinedEvent {
    JoinedEvent {
        session: SessionSnapshot::capture(session, Instant::now()),
        player: PlayerSummary::from(player),
    }
}

/// Reply sent to a socket whose message was rejected.
pub fn error_event(err: &impl Display) -> SessionEvent {
    SessionEvent::Error(ErrorEvent {
        message: err.to_string(),
    })
}
