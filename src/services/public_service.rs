//! Service helpers that expose read-only public projections of the room.

use tokio::time::Instant;

use crate::{
    dto::session::{LeaderboardResponse, RoundSnapshot, SessionSnapshot},
    error::ServiceError,
    state::SharedState,
};

/// Return a snapshot of the whole session.
pub async fn get_session(state: &SharedState) -> SessionSnapshot {
    state
        .read_session(|session| SessionSnapshot::capture(session, Instant::now()))
        .await
}

/// Return the players ranked by score.
pub async fn get_leaderboard(state: &SharedState) -> LeaderboardResponse {
    state
        .read_session(|session| LeaderboardResponse::from(session.leaderboard()))
        .await
}

/// Return the current round, without its answer until it has been revealed.
pub async fn get_round(state: &SharedState) -> Result<RoundSnapshot, ServiceError> {
    state
        .read_session(|session| {
            session
                .current_round
                .as_ref()
                .map(|round| RoundSnapshot::capture(round, session.phase(), Instant::now()))
                .ok_or_else(|| ServiceError::NotFound("no round in progress".into()))
        })
        .await
}
