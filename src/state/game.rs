use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

use indexmap::IndexMap;
use tokio::time::Instant;
use uuid::Uuid;

use crate::state::state_machine::{
    InvalidTransition, RoundEvent, RoundPhase, RoundStateMachine, SessionPhase,
};

/// Artist credited on a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    /// Display name.
    pub name: String,
    /// URI of the artist picture.
    pub picture: String,
}

/// Metadata for a playable song of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Provider identifier of the track.
    pub id: u64,
    /// URI of the short audio sample sent before the answer is revealed.
    pub preview: String,
    /// Song title.
    pub title: String,
    /// Credited artist.
    pub artist: Artist,
}

impl Song {
    /// A song can only be played when it carries a preview.
    pub fn is_playable(&self) -> bool {
        !self.preview.is_empty()
    }
}

/// Player tracked in the room roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identifier issued on join and reused on reconnect.
    pub id: Uuid,
    /// Display name chosen when joining.
    pub name: String,
    /// Current score for the session.
    pub score: u32,
}

impl Player {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            score: 0,
        }
    }
}

/// Guessable components of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The song title.
    Title,
    /// The artist name.
    Artist,
}

/// One play, guess and reveal cycle.
#[derive(Debug, Clone)]
pub struct Round {
    /// Sequence number within the session, starting at 1.
    pub number: u32,
    /// Song played in this round.
    pub song: Song,
    /// Wall-clock opening time, exposed to clients.
    pub started_at: SystemTime,
    /// Instant the collecting window opened.
    pub opened_at: Instant,
    /// Instant the collecting window closes.
    pub deadline: Instant,
    /// Fields already awarded to each player during this round.
    awards: HashMap<Uuid, Vec<Field>>,
}

impl Round {
    fn new(number: u32, song: Song, window: Duration, now: Instant) -> Self {
        Self {
            number,
            song,
            started_at: SystemTime::now(),
            opened_at: now,
            deadline: now + window,
            awards: HashMap::new(),
        }
    }

    /// Time left in the collecting window, zero once it has elapsed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Length of the collecting window.
    pub fn window(&self) -> Duration {
        self.deadline.saturating_duration_since(self.opened_at)
    }

    /// Record `field` for `player_id`, returning `false` if it was already awarded this round.
    pub fn claim(&mut self, player_id: Uuid, field: Field) -> bool {
        let claimed = self.awards.entry(player_id).or_default();
        if claimed.contains(&field) {
            return false;
        }
        claimed.push(field);
        true
    }
}

/// Aggregate state for the single game room.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    /// Roster in join order.
    pub players: IndexMap<Uuid, Player>,
    /// Round currently played or last revealed; `None` before the first round.
    pub current_round: Option<Round>,
    /// Songs revealed during this session, oldest first.
    pub history: Vec<Song>,
    /// Number of the most recent round, 0 when no round has been played.
    pub round_number: u32,
    machine: RoundStateMachine,
}

impl GameSession {
    /// Empty roster, idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new player with a fresh identifier and a zero score.
    pub fn join(&mut self, name: String) -> Player {
        let player = Player::new(name);
        self.players.insert(player.id, player.clone());
        player
    }

    /// Remove a player, keeping the relative order of everyone else.
    pub fn leave(&mut self, id: &Uuid) -> Option<Player> {
        self.players.shift_remove(id)
    }

    /// Player with the given id, if still in the roster.
    pub fn lookup(&self, id: &Uuid) -> Option<&Player> {
        self.players.get(id)
    }

    /// Players sorted by descending score; ties keep join order.
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut board: Vec<Player> = self.players.values().cloned().collect();
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board
    }

    /// Add `points` to a player's score, returning the new score.
    pub fn award(&mut self, id: &Uuid, points: u32) -> Option<u32> {
        let player = self.players.get_mut(id)?;
        player.score = player.score.saturating_add(points);
        Some(player.score)
    }

    /// Set every score back to zero.
    pub fn reset_scores(&mut self) {
        self.players
            .values_mut()
            .for_each(|player| player.score = 0);
    }

    /// Current round phase.
    pub fn phase(&self) -> RoundPhase {
        self.machine.phase()
    }

    /// Session phase derived from the round phase.
    pub fn session_phase(&self) -> SessionPhase {
        self.machine.phase().into()
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.machine.version()
    }

    /// Apply a round lifecycle event to the state machine.
    pub fn apply(&mut self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        self.machine.apply(event)
    }

    /// Install the next round with the given song and collecting window.
    pub fn open_round(&mut self, song: Song, window: Duration, now: Instant) -> &Round {
        self.round_number += 1;
        self.current_round
            .insert(Round::new(self.round_number, song, window, now))
    }

    /// The current round, if it still accepts guesses at `now`.
    pub fn accepting_round_mut(&mut self, now: Instant) -> Option<&mut Round> {
        if self.machine.phase() != RoundPhase::Collecting {
            return None;
        }
        self.current_round
            .as_mut()
            .filter(|round| now < round.deadline)
    }

    /// Append the current round's song to the history and return it.
    pub fn record_reveal(&mut self) -> Option<Song> {
        let song = self.current_round.as_ref()?.song.clone();
        self.history.push(song.clone());
        Some(song)
    }

    /// Reset scores, history and round numbering at the end of a session.
    pub fn finalize(&mut self) {
        self.reset_scores();
        self.history.clear();
        self.round_number = 0;
        self.current_round = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::song;

    fn session_with(names: &[&str]) -> (GameSession, Vec<Uuid>) {
        let mut session = GameSession::new();
        let ids = names
            .iter()
            .map(|name| session.join(name.to_string()).id)
            .collect();
        (session, ids)
    }

    #[test]
    fn join_appends_players_with_zero_score() {
        let (session, ids) = session_with(&["alice", "bob"]);
        let roster: Vec<_> = session.players.values().map(|p| p.name.as_str()).collect();
        assert_eq!(roster, vec!["alice", "bob"]);
        assert_ne!(ids[0], ids[1]);
        assert!(session.players.values().all(|p| p.score == 0));
    }

    #[test]
    fn leave_removes_only_the_target() {
        let (mut session, ids) = session_with(&["alice", "bob", "carol"]);
        session.award(&ids[0], 30);
        session.award(&ids[2], 10);

        let removed = session.leave(&ids[1]).unwrap();
        assert_eq!(removed.name, "bob");

        let remaining: Vec<_> = session.players.values().cloned().collect();
        assert_eq!(remaining.len(), 2);
        assert_eq!((remaining[0].id, remaining[0].score), (ids[0], 30));
        assert_eq!((remaining[1].id, remaining[1].score), (ids[2], 10));
        assert!(session.leave(&ids[1]).is_none());
    }

    #[test]
    fn lookup_never_fabricates() {
        let (session, ids) = session_with(&["alice"]);
        assert_eq!(session.lookup(&ids[0]).unwrap().name, "alice");
        assert!(session.lookup(&Uuid::new_v4()).is_none());
        assert_eq!(session.players.len(), 1);
    }

    #[test]
    fn leaderboard_is_descending_and_stable() {
        let (mut session, ids) = session_with(&["a", "b", "c", "d", "e"]);
        session.award(&ids[1], 20);
        session.award(&ids[2], 10);
        session.award(&ids[3], 20);
        session.award(&ids[4], 10);

        let names: Vec<_> = session
            .leaderboard()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["b", "d", "c", "e", "a"]);

        // Roster order is untouched by the derived view.
        let roster: Vec<_> = session.players.values().map(|p| p.name.clone()).collect();
        assert_eq!(roster, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn reset_scores_keeps_membership() {
        let (mut session, ids) = session_with(&["a", "b"]);
        session.award(&ids[0], 10);
        session.reset_scores();
        assert_eq!(session.players.len(), 2);
        assert!(session.players.values().all(|p| p.score == 0));
    }

    #[test]
    fn claim_awards_each_field_once_per_player() {
        let now = Instant::now();
        let mut session = GameSession::new();
        let round_song = song(1, "Title", "Artist");
        session.open_round(round_song, Duration::from_secs(30), now);
        let round = session.current_round.as_mut().unwrap();

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        assert!(round.claim(alice, Field::Title));
        assert!(!round.claim(alice, Field::Title));
        assert!(round.claim(alice, Field::Artist));
        assert!(round.claim(bob, Field::Title));
    }

    #[test]
    fn accepting_round_requires_collecting_phase_and_open_window() {
        let now = Instant::now();
        let mut session = GameSession::new();
        session.open_round(song(1, "T", "A"), Duration::from_secs(30), now);
        assert!(session.accepting_round_mut(now).is_none());

        session.apply(RoundEvent::Announce).unwrap();
        session.apply(RoundEvent::OpenGuesses).unwrap();
        assert!(session.accepting_round_mut(now).is_some());
        assert!(
            session
                .accepting_round_mut(now + Duration::from_secs(30))
                .is_none()
        );

        let round = session.current_round.as_ref().unwrap();
        assert_eq!(round.remaining(now + Duration::from_secs(10)), Duration::from_secs(20));
        assert_eq!(round.remaining(now + Duration::from_secs(45)), Duration::ZERO);
    }

    #[test]
    fn finalize_resets_numbering_history_and_scores() {
        let now = Instant::now();
        let (mut session, ids) = session_with(&["a"]);
        session.open_round(song(1, "T", "A"), Duration::from_secs(30), now);
        session.record_reveal();
        session.open_round(song(2, "U", "B"), Duration::from_secs(30), now);
        session.award(&ids[0], 10);
        assert_eq!(session.round_number, 2);
        assert_eq!(session.history.len(), 1);

        session.finalize();
        assert_eq!(session.round_number, 0);
        assert!(session.history.is_empty());
        assert!(session.current_round.is_none());
        assert_eq!(session.lookup(&ids[0]).unwrap().score, 0);
    }
}
