use tracing::warn;

use crate::{
    dto::{health::HealthResponse, phase::VisibleRoundPhase},
    state::SharedState,
};

/// Report catalog size, round phase and whether the round loop is alive.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let catalog_size = state.catalog().len();
    let (phase, players): (VisibleRoundPhase, usize) = state
        .read_session(|session| (session.phase().into(), session.players.len()))
        .await;

    if state.scheduler_running() {
        HealthResponse::ok(catalog_size, phase, players)
    } else {
        warn!("round loop is not running");
        HealthResponse::stopped(catalog_size, phase, players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;

    #[tokio::test]
    async fn reports_stopped_until_the_loop_runs() {
        let state = test_state();
        let health = health_status(&state).await;
        assert_eq!(health.status, "stopped");
        assert_eq!(health.catalog_size, 3);
        assert_eq!(health.phase, VisibleRoundPhase::Idle);

        state.set_scheduler_running(true);
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
