use utoipa::OpenApi;

/// Aggregated OpenAPI document for Blind Test Back.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::room_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::public::get_session,
        crate::routes::public::get_leaderboard,
        crate::routes::public::get_round,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::RoundSnapshot,
            crate::dto::session::LeaderboardResponse,
            crate::dto::events::RoundStartedEvent,
            crate::dto::events::ArtistGuessedEvent,
            crate::dto::events::SongGuessedEvent,
            crate::dto::events::SessionUpdatedEvent,
            crate::dto::events::RoundRevealedEvent,
            crate::dto::events::SessionFinishedEvent,
            crate::dto::events::JoinedEvent,
            crate::dto::events::ErrorEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Read-only views of the room"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "players", description = "WebSocket operations for players"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/sse/room",
            "/ws",
            "/public/session",
            "/public/leaderboard",
            "/public/round",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
