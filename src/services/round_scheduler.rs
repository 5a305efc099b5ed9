//! Drives the room through announce, collect, reveal and cooldown, round after round.

use tokio::{
    sync::watch,
    time::{Instant, sleep_until},
};
use tracing::{debug, info};

use crate::{
    error::SchedulerError,
    services::session_events,
    state::{SharedState, state_machine::RoundEvent},
};

/// Run rounds until `shutdown` flips to `true` or its sender is dropped.
///
/// Returns an error when the loop cannot continue, for example when no song can
/// be drawn for the next round.
pub async fn run(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), SchedulerError> {
    state.set_scheduler_running(true);
    info!(
        round_limit = state.config().round_limit,
        catalog_size = state.catalog().len(),
        "round loop started"
    );
    let result = run_rounds(&state, &mut shutdown).await;
    state.set_scheduler_running(false);
    info!(ok = result.is_ok(), "round loop stopped");
    result
}

async fn run_rounds(
    state: &SharedState,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), SchedulerError> {
    let cooldown = state.config().cooldown;
    loop {
        let deadline = announce_round(state).await?;
        if !wait_until(deadline, shutdown).await {
            return Ok(());
        }

        reveal_round(state).await?;
        if !wait_until(Instant::now() + cooldown, shutdown).await {
            return Ok(());
        }

        complete_round(state).await?;
    }
}

/// Sleep until `deadline`. Returns `false` when shutdown was requested first.
async fn wait_until(deadline: Instant, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = sleep_until(deadline) => true,
        _ = shutdown.changed() => {
            debug!("shutdown requested while waiting");
            false
        }
    }
}

/// Draw a song, open the next round and announce it. Returns the guess deadline.
pub async fn announce_round(state: &SharedState) -> Result<Instant, SchedulerError> {
    let window = state.config().collect_window;
    let mut session = state.session().write().await;

    session.apply(RoundEvent::Announce)?;
    let song = state.catalog().pick_random()?;
    let round = session.open_round(song, window, Instant::now());
    let deadline = round.deadline;
    info!(
        round = round.number,
        song_id = round.song.id,
        title = %round.song.title,
        artist = %round.song.artist.name,
        "round started"
    );
    session_events::broadcast_round_started(state, round);
    session.apply(RoundEvent::OpenGuesses)?;

    Ok(deadline)
}

/// Close guesses, record the song in the history and reveal it to the room.
pub async fn reveal_round(state: &SharedState) -> Result<(), SchedulerError> {
    let mut session = state.session().write().await;

    session.apply(RoundEvent::CloseGuesses)?;
    if let Some(song) = session.record_reveal() {
        let round = session.round_number;
        info!(round, song_id = song.id, "round revealed");
        session_events::broadcast_round_revealed(state, round, &song);
    }
    session.apply(RoundEvent::StartCooldown)?;

    Ok(())
}

/// End of cooldown. Once the round limit is reached the session is finished,
/// the leaderboard published and everything reset for the next session.
///
/// Returns `true` when a session was finished.
pub async fn complete_round(state: &SharedState) -> Result<bool, SchedulerError> {
    let round_limit = state.config().round_limit;
    let mut session = state.session().write().await;

    if session.round_number < round_limit {
        return Ok(false);
    }

    session.apply(RoundEvent::Finish)?;
    let leaderboard = session.leaderboard();
    info!(
        rounds = session.round_number,
        players = leaderboard.len(),
        winner = leaderboard.first().map(|p| p.name.as_str()).unwrap_or("-"),
        "session finished"
    );
    session_events::broadcast_session_finished(state, &leaderboard);

    session.finalize();
    session.apply(RoundEvent::Reset)?;
    session_events::broadcast_session_updated(state, &session);

    Ok(true)
}
