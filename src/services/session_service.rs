//! Player-facing session operations: joining, reconnecting, leaving and guessing.
//!
//! Every operation resolves against the live session while holding the session
//! lock, so roster changes and score updates never interleave.

use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{events::JoinedEvent, validation::validate_player_name},
    error::ServiceError,
    services::{guess_evaluator, session_events},
    state::{
        SharedState,
        game::{Field, Player},
    },
};

/// Result of evaluating one guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Whether the guess was evaluated against an open round.
    pub accepted: bool,
    /// The guess matched a title not yet awarded to this player.
    pub title_matched: bool,
    /// The guess matched an artist not yet awarded to this player.
    pub artist_matched: bool,
    /// Points added to the player's score by this guess.
    pub points_awarded: u32,
}

/// Parse a client-supplied player id; anything that is not a UUID is unknown.
pub fn parse_player_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::PlayerNotFound(raw.to_string()))
}

/// Add a player to the room and return the reply for their socket.
pub async fn join(state: &SharedState, player_name: &str) -> Result<JoinedEvent, ServiceError> {
    validate_player_name(player_name)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let name = player_name.trim().to_string();

    state
        .with_session_mut(|session| {
            let player = session.join(name);
            info!(player_id = %player.id, name = %player.name, "player joined");
            session_events::broadcast_session_updated(state, session);
            Ok(session_events::joined_reply(session, &player))
        })
        .await
}

/// Resume a previously issued identity without creating a new player.
pub async fn reconnect(state: &SharedState, player_id: &Uuid) -> Result<JoinedEvent, ServiceError> {
    state
        .read_session(|session| {
            let player = session
                .lookup(player_id)
                .ok_or_else(|| ServiceError::PlayerNotFound(player_id.to_string()))?;
            info!(player_id = %player.id, name = %player.name, "player reconnected");
            Ok(session_events::joined_reply(session, player))
        })
        .await
}

/// Remove a player from the room. Returns `None` when the id is unknown.
pub async fn leave(state: &SharedState, player_id: &Uuid) -> Option<Player> {
    let mut session = state.session().write().await;
    let removed = session.leave(player_id)?;
    info!(player_id = %removed.id, name = %removed.name, "player left");
    session_events::broadcast_session_updated(state, &session);
    Some(removed)
}

/// Remove a disconnected player once the grace period elapsed, unless the
/// player has an open connection again by then.
pub async fn leave_after_grace(state: SharedState, player_id: Uuid) -> Option<Player> {
    sleep(state.config().disconnect_grace).await;

    let mut session = state.session().write().await;
    if state.broadcaster().is_connected(&player_id) {
        debug!(%player_id, "player reconnected during grace period");
        return None;
    }
    let removed = session.leave(&player_id)?;
    info!(player_id = %removed.id, name = %removed.name, "disconnected player removed");
    session_events::broadcast_session_updated(&state, &session);
    Some(removed)
}

/// Evaluate a guess against the current round and award points.
///
/// Each field is awarded at most once per player and round. Guesses arriving
/// outside the collecting window are ignored.
pub async fn submit_guess(
    state: &SharedState,
    player_id: &Uuid,
    guess: &str,
) -> Result<GuessOutcome, ServiceError> {
    let now = Instant::now();
    let points = state.config().points_per_field;

    state
        .with_session_mut(|session| {
            if session.lookup(player_id).is_none() {
                return Err(ServiceError::PlayerNotFound(player_id.to_string()));
            }

            let Some(round) = session.accepting_round_mut(now) else {
                debug!(%player_id, "guess outside collecting window ignored");
                return Ok(GuessOutcome::default());
            };

            let matched = guess_evaluator::evaluate(guess, &round.song);
            let artist_awarded = matched.artist && round.claim(*player_id, Field::Artist);
            let title_awarded = matched.title && round.claim(*player_id, Field::Title);
            let song = round.song.clone();
            let round_number = round.number;

            let mut outcome = GuessOutcome {
                accepted: true,
                title_matched: matched.title,
                artist_matched: matched.artist,
                points_awarded: 0,
            };

            if !(artist_awarded || title_awarded) {
                debug!(%player_id, round = round_number, matched = matched.any(), "guess awarded nothing");
                return Ok(outcome);
            }

            outcome.points_awarded = points * (u32::from(artist_awarded) + u32::from(title_awarded));
            let score = session.award(player_id, outcome.points_awarded);
            info!(
                %player_id,
                round = round_number,
                artist = artist_awarded,
                title = title_awarded,
                score,
                "guess scored"
            );

            if artist_awarded {
                session_events::send_artist_guessed(state, player_id, &song.artist);
            }
            if title_awarded {
                session_events::send_song_guessed(state, player_id, &song.title);
            }
            session_events::broadcast_session_updated(state, session);

            Ok(outcome)
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        catalog::tests::song,
        config::AppConfig,
        dto::events::SessionEvent,
        services::round_scheduler,
        state::tests::test_state_with,
    };

    fn single_song_state() -> SharedState {
        test_state_with(
            AppConfig::default(),
            vec![song(1, "Around the World", "Daft Punk")],
        )
    }

    #[tokio::test]
    async fn join_then_reconnect_returns_the_same_player() {
        let state = single_song_state();
        let joined = join(&state, "  Alice ").await.unwrap();
        assert_eq!(joined.player.name, "Alice");
        assert_eq!(joined.player.score, 0);

        let again = reconnect(&state, &joined.player.id).await.unwrap();
        assert_eq!(again.player, joined.player);
        assert_eq!(again.session.players.len(), 1);
    }

    #[tokio::test]
    async fn reconnect_with_unknown_id_fails() {
        let state = single_song_state();
        join(&state, "Alice").await.unwrap();

        let err = reconnect(&state, &Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::PlayerNotFound(_)));
        assert!(matches!(
            parse_player_id("not-a-uuid"),
            Err(ServiceError::PlayerNotFound(_))
        ));
        assert_eq!(state.read_session(|s| s.players.len()).await, 1);
    }

    #[tokio::test]
    async fn join_rejects_blank_names() {
        let state = single_song_state();
        let err = join(&state, "   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(state.read_session(|s| s.players.len()).await, 0);
    }

    #[tokio::test]
    async fn leave_removes_only_that_player() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        let bob = join(&state, "Bob").await.unwrap().player;
        let carol = join(&state, "Carol").await.unwrap().player;

        assert_eq!(leave(&state, &bob.id).await.unwrap().name, "Bob");
        assert!(leave(&state, &bob.id).await.is_none());

        let roster: Vec<Uuid> = state
            .read_session(|s| s.players.keys().copied().collect())
            .await;
        assert_eq!(roster, vec![alice.id, carol.id]);
    }

    #[tokio::test]
    async fn guess_from_unknown_player_mutates_nothing() {
        let state = single_song_state();
        round_scheduler::announce_round(&state).await.unwrap();
        let version = state.read_session(|s| s.version()).await;

        let err = submit_guess(&state, &Uuid::new_v4(), "Around the World")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PlayerNotFound(_)));
        assert_eq!(state.read_session(|s| s.version()).await, version);
        assert!(state.read_session(|s| s.players.is_empty()).await);
    }

    #[tokio::test]
    async fn title_guess_scores_once_per_round() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.broadcaster().register(alice.id, tx);
        let mut room = state.broadcaster().subscribe();
        round_scheduler::announce_round(&state).await.unwrap();

        let outcome = submit_guess(&state, &alice.id, "around the world")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuessOutcome {
                accepted: true,
                title_matched: true,
                artist_matched: false,
                points_awarded: 10,
            }
        );
        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::SongGuessed(event)) if event.title == "Around the World"
        ));

        let repeated = submit_guess(&state, &alice.id, "AROUND THE WORLD!")
            .await
            .unwrap();
        assert!(repeated.title_matched);
        assert_eq!(repeated.points_awarded, 0);
        assert!(rx.try_recv().is_err());

        let score = state
            .read_session(|s| s.lookup(&alice.id).map(|p| p.score))
            .await;
        assert_eq!(score, Some(10));

        assert!(matches!(room.recv().await, Ok(SessionEvent::RoundStarted(_))));
        match room.recv().await.unwrap() {
            SessionEvent::SessionUpdated(update) => {
                assert_eq!(update.session.players[0].score, 10);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(room.try_recv().is_err());
    }

    #[tokio::test]
    async fn artist_then_title_accumulates() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        round_scheduler::announce_round(&state).await.unwrap();

        let artist = submit_guess(&state, &alice.id, "daft punk").await.unwrap();
        assert!(artist.artist_matched && !artist.title_matched);
        let title = submit_guess(&state, &alice.id, "Around The World").await.unwrap();
        assert_eq!(title.points_awarded, 10);

        let score = state
            .read_session(|s| s.lookup(&alice.id).map(|p| p.score))
            .await;
        assert_eq!(score, Some(20));
    }

    #[tokio::test]
    async fn guess_while_idle_is_ignored() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        let outcome = submit_guess(&state, &alice.id, "Around the World")
            .await
            .unwrap();
        assert_eq!(outcome, GuessOutcome::default());
    }

    #[tokio::test(start_paused = true)]
    async fn late_guess_after_deadline_is_ignored() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        round_scheduler::announce_round(&state).await.unwrap();

        tokio::time::advance(state.config().collect_window).await;
        let outcome = submit_guess(&state, &alice.id, "Around the World")
            .await
            .unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.points_awarded, 0);
    }

    #[tokio::test]
    async fn concurrent_guesses_do_not_lose_updates() {
        let state = single_song_state();
        let mut players = Vec::new();
        for i in 0..16 {
            players.push(join(&state, &format!("player {i}")).await.unwrap().player);
        }
        round_scheduler::announce_round(&state).await.unwrap();

        let mut handles = Vec::new();
        for player in &players {
            for guess in ["daft punk", "around the world", "daft punk"] {
                let state = Arc::clone(&state);
                let id = player.id;
                handles.push(tokio::spawn(async move {
                    submit_guess(&state, &id, guess).await.unwrap()
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let scores: Vec<u32> = state
            .read_session(|s| s.players.values().map(|p| p.score).collect())
            .await;
        assert!(scores.iter().all(|score| *score == 20));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnected_player_is_removed_after_grace() {
        let state = single_song_state();
        let alice = join(&state, "Alice").await.unwrap().player;
        let bob = join(&state, "Bob").await.unwrap().player;
        let (tx, _rx) = mpsc::unbounded_channel();
        state.broadcaster().register(bob.id, tx);

        let removed = leave_after_grace(state.clone(), alice.id).await;
        assert_eq!(removed.map(|p| p.id), Some(alice.id));

        // Bob still holds a live connection, so his seat is kept.
        assert!(leave_after_grace(state.clone(), bob.id).await.is_none());
        assert!(state.read_session(|s| s.lookup(&bob.id).is_some()).await);
    }
}
