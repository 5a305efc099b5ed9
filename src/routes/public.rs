use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::session::{LeaderboardResponse, RoundSnapshot, SessionSnapshot},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current room state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/session", get(get_session))
        .route("/public/leaderboard", get(get_leaderboard))
        .route("/public/round", get(get_round))
}

#[utoipa::path(
    get,
    path = "/public/session",
    tag = "public",
    responses((status = 200, description = "Current session", body = SessionSnapshot))
)]
/// Return the roster, the current round and the play history.
pub async fn get_session(State(state): State<SharedState>) -> Json<SessionSnapshot> {
    Json(public_service::get_session(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/leaderboard",
    tag = "public",
    responses((status = 200, description = "Players ranked by score", body = LeaderboardResponse))
)]
/// Return the players ranked by descending score.
pub async fn get_leaderboard(State(state): State<SharedState>) -> Json<LeaderboardResponse> {
    Json(public_service::get_leaderboard(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/round",
    tag = "public",
    responses(
        (status = 200, description = "Current round", body = RoundSnapshot),
        (status = 404, description = "No round in progress")
    )
)]
/// Return the round being played and its remaining time.
pub async fn get_round(
    State(state): State<SharedState>,
) -> Result<Json<RoundSnapshot>, AppError> {
    let payload = public_service::get_round(&state).await?;
    Ok(Json(payload))
}
