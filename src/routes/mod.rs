use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Read-only session views.
pub mod public;
/// Observer event stream.
pub mod sse;
/// Player WebSocket upgrade.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(public::router());

    api_router.merge(docs::router()).with_state(state)
}
