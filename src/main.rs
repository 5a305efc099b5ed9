//! Blind Test Back binary entrypoint wiring the playlist, round loop, REST, WebSocket and SSE layers.

use std::{env, future::IntoFuture, net::SocketAddr};

use anyhow::Context;
use axum::{Router, http::HeaderValue};
use tokio::{net::TcpListener, sync::watch};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blind_test_back::{
    catalog::{http::HttpPlaylistSource, load_catalog},
    config::AppConfig,
    routes,
    services::round_scheduler,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let source = HttpPlaylistSource::new().context("building playlist client")?;
    let catalog = load_catalog(&source, &config.playlist_uri)
        .await
        .with_context(|| format!("loading playlist from {}", config.playlist_uri))?;

    let cors = build_cors(&config.allowed_origins);
    let app_state = AppState::new(config, catalog);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut scheduler = tokio::spawn(round_scheduler::run(app_state.clone(), shutdown_rx));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state, cors);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        served = server => {
            served.context("serving axum")?;
            let _ = shutdown_tx.send(true);
            scheduler
                .await
                .context("joining round loop")?
                .context("round loop failed")?;
        }
        stopped = &mut scheduler => {
            // The round loop only returns on its own when it cannot go on.
            match stopped.context("joining round loop")? {
                Ok(()) => anyhow::bail!("round loop exited unexpectedly"),
                Err(err) => {
                    error!(error = %err, "round loop failed; shutting down");
                    return Err(err).context("round loop failed");
                }
            }
        }
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState, cors: CorsLayer) -> Router<()> {
    routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Restrict CORS to the configured origins, or allow any origin when none are set.
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
