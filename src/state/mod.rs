/// Room and per-player event fan-out.
pub mod broadcaster;
/// Roster, rounds and scores.
pub mod game;
/// Round lifecycle transitions.
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    catalog::Catalog,
    config::AppConfig,
    error::ServiceError,
    state::{game::GameSession, state_machine::RoundPhase},
};

pub use self::broadcaster::SessionBroadcaster;

/// Handle to the application state shared by every task.
pub type SharedState = Arc<AppState>;

/// Per-subscriber buffer of the room channel.
const ROOM_CHANNEL_CAPACITY: usize = 64;

/// Central application state: configuration, catalog, the game session and its fan-out.
pub struct AppState {
    config: Arc<AppConfig>,
    catalog: Arc<Catalog>,
    session: RwLock<GameSession>,
    broadcaster: SessionBroadcaster,
    scheduler_running: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, catalog: Catalog) -> SharedState {
        let (scheduler_running, _rx) = watch::channel(false);
        Arc::new(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            session: RwLock::new(GameSession::new()),
            broadcaster: SessionBroadcaster::new(ROOM_CHANNEL_CAPACITY),
            scheduler_running,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Songs available to the round loop.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fan-out used to reach the room or a single player.
    pub fn broadcaster(&self) -> &SessionBroadcaster {
        &self.broadcaster
    }

    /// The game session; every mutation must hold the write lock for its whole duration.
    pub fn session(&self) -> &RwLock<GameSession> {
        &self.session
    }

    /// Snapshot the current round phase.
    pub async fn round_phase(&self) -> RoundPhase {
        self.session.read().await.phase()
    }

    /// Run `f` against a read-only view of the session.
    pub async fn read_session<R>(&self, f: impl FnOnce(&GameSession) -> R) -> R {
        let guard = self.session.read().await;
        f(&guard)
    }

    /// Run `f` with exclusive access to the session.
    pub async fn with_session_mut<R>(
        &self,
        f: impl FnOnce(&mut GameSession) -> Result<R, ServiceError>,
    ) -> Result<R, ServiceError> {
        let mut guard = self.session.write().await;
        f(&mut guard)
    }

    /// Whether the round loop is currently running.
    pub fn scheduler_running(&self) -> bool {
        *self.scheduler_running.borrow()
    }

    /// Record whether the round loop is running.
    pub fn set_scheduler_running(&self, value: bool) {
        self.scheduler_running.send_replace(value);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{catalog::tests::song, state::game::Song};

    /// Shared state over a fixed catalog, without a running round loop.
    pub(crate) fn test_state_with(config: AppConfig, songs: Vec<Song>) -> SharedState {
        let catalog = Catalog::new(songs).expect("test catalog must not be empty");
        AppState::new(config, catalog)
    }

    pub(crate) fn test_state() -> SharedState {
        test_state_with(
            AppConfig::default(),
            vec![
                song(1, "Around the World", "Daft Punk"),
                song(2, "Karma Police", "Radiohead"),
                song(3, "Hoppípolla", "Sigur Rós"),
            ],
        )
    }

    #[tokio::test]
    async fn with_session_mut_serializes_writers() {
        let state = test_state();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = state.clone();
                tokio::spawn(async move {
                    state
                        .with_session_mut(|session| Ok(session.join(format!("p{i}"))))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(state.read_session(|s| s.players.len()).await, 8);
        assert_eq!(state.round_phase().await, RoundPhase::Idle);
    }

    #[test]
    fn scheduler_flag_round_trips() {
        let state = test_state();
        assert!(!state.scheduler_running());
        state.set_scheduler_running(true);
        assert!(state.scheduler_running());
    }
}
