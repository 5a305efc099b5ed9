use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        events::SessionEvent,
        ws::{ClientMessage, ClientMessageError},
    },
    error::ServiceError,
    services::{session_events, session_service},
    state::SharedState,
};

/// Errors raised while handling a player frame.
///
/// Each of them is reported to the originating socket as an `error` event and
/// never mutates the session.
#[derive(Debug, Error)]
enum GatewayError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
    /// The frame could not be parsed or validated.
    #[error(transparent)]
    Message(#[from] ClientMessageError),
    /// `join` or `reconnect` on a socket that already represents a player.
    #[error("socket already bound to player `{0}`")]
    AlreadyBound(Uuid),
    /// A guess arrived before the socket joined or reconnected.
    #[error("join or reconnect before guessing")]
    NotBound,
    /// Player id in the message doesn't match the socket's player.
    #[error("guess ignored: mismatched player id (expected {expected}, got {got})")]
    MismatchedId { expected: Uuid, got: Uuid },
    /// Players talk JSON over text frames only.
    #[error("binary frames are not supported")]
    BinaryFrame,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Player represented by a socket, and the connection it registered.
#[derive(Debug, Clone, Copy)]
struct Binding {
    player_id: Uuid,
    connection_id: Uuid,
}

/// Handle the full lifecycle for an individual player WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (sender, mut receiver) = socket.split();
    let (events_tx, events_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let room_rx = state.broadcaster().subscribe();

    let writer_task = spawn_writer(sender, events_rx, room_rx);
    let mut binding: Option<Binding> = None;
    debug!("player socket opened");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let result = match ClientMessage::from_json_str(&text) {
                    Ok(message) => handle_client_message(&state, &mut binding, message, &events_tx).await,
                    Err(err) => Err(err.into()),
                };
                if let Err(err) = result {
                    if !reject(binding, &events_tx, err) {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                debug!(player_id = ?binding.map(|b| b.player_id), "player socket closed");
                break;
            }
            Ok(Message::Binary(_)) => {
                if !reject(binding, &events_tx, GatewayError::BinaryFrame) {
                    break;
                }
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(error = %err, "websocket error");
                break;
            }
        }
    }

    release_binding(&state, binding);
    finalize(writer_task, events_tx).await;
}

/// Report `err` to the socket as an `error` event.
///
/// Returns `false` when the socket can no longer be written to.
fn reject(
    binding: Option<Binding>,
    events_tx: &mpsc::UnboundedSender<SessionEvent>,
    err: GatewayError,
) -> bool {
    if matches!(err, GatewayError::ConnectionClosed) {
        info!("connection closed while replying, terminating");
        return false;
    }
    warn!(
        player_id = ?binding.map(|b| b.player_id),
        error = %err,
        "rejected player message"
    );
    events_tx.send(session_events::error_event(&err)).is_ok()
}

/// Unregister the socket of a closing connection.
///
/// The grace-period removal is scheduled only when this was the player's last
/// open socket. Returns `true` in that case.
fn release_binding(state: &SharedState, binding: Option<Binding>) -> bool {
    let Some(Binding {
        player_id,
        connection_id,
    }) = binding
    else {
        return false;
    };
    if !state.broadcaster().unregister(&player_id, connection_id) {
        debug!(
            %player_id,
            remaining = state.broadcaster().connection_count(&player_id),
            "player socket closed, other sockets still open"
        );
        return false;
    }
    info!(%player_id, "player disconnected, waiting for reconnection");
    tokio::spawn(session_service::leave_after_grace(state.clone(), player_id));
    true
}

/// Forward player events and room events to the socket until either side closes.
fn spawn_writer(
    mut sender: futures::stream::SplitSink<WebSocket, Message>,
    mut events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    mut room_rx: broadcast::Receiver<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                maybe = events_rx.recv() => match maybe {
                    Some(event) => event,
                    None => break,
                },
                received = room_rx.recv() => match received {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "player socket lagging behind room events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let Some(message) = encode_event(&event) else {
                continue;
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

fn encode_event(event: &SessionEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(event = event.name(), error = %err, "failed to serialize event");
            None
        }
    }
}

async fn handle_client_message(
    state: &SharedState,
    binding: &mut Option<Binding>,
    message: ClientMessage,
    events_tx: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), GatewayError> {
    match message {
        ClientMessage::Join { player_name } => {
            if let Some(bound) = binding {
                return Err(GatewayError::AlreadyBound(bound.player_id));
            }
            let joined = session_service::join(state, &player_name).await?;
            let player_id = joined.player.id;
            let connection_id = state.broadcaster().register(player_id, events_tx.clone());
            *binding = Some(Binding {
                player_id,
                connection_id,
            });
            events_tx
                .send(SessionEvent::Joined(joined))
                .map_err(|_| GatewayError::ConnectionClosed)
        }
        ClientMessage::Reconnect { player_id } => {
            if let Some(bound) = binding {
                return Err(GatewayError::AlreadyBound(bound.player_id));
            }
            let player_id = session_service::parse_player_id(&player_id)?;
            // Registered first so a pending grace-period removal sees the new connection.
            let connection_id = state.broadcaster().register(player_id, events_tx.clone());
            let joined = match session_service::reconnect(state, &player_id).await {
                Ok(joined) => joined,
                Err(err) => {
                    state.broadcaster().unregister(&player_id, connection_id);
                    return Err(err.into());
                }
            };
            *binding = Some(Binding {
                player_id,
                connection_id,
            });
            events_tx
                .send(SessionEvent::Joined(joined))
                .map_err(|_| GatewayError::ConnectionClosed)
        }
        ClientMessage::Guess { player_id, guess } => {
            let bound = binding.ok_or(GatewayError::NotBound)?;
            let player_id = session_service::parse_player_id(&player_id)?;
            if player_id != bound.player_id {
                return Err(GatewayError::MismatchedId {
                    expected: bound.player_id,
                    got: player_id,
                });
            }
            let outcome = session_service::submit_guess(state, &player_id, &guess).await?;
            debug!(%player_id, ?outcome, "guess handled");
            Ok(())
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, events_tx: mpsc::UnboundedSender<SessionEvent>) {
    drop(events_tx);
    let _ = writer_task.await;
}
