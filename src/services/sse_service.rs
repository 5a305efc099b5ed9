use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{dto::events::SessionEvent, state::SharedState};

/// Subscribe to the room-wide event stream.
pub fn subscribe_room(state: &SharedState) -> broadcast::Receiver<SessionEvent> {
    state.broadcaster().subscribe()
}

/// Render one room event as an SSE frame named after the event.
pub fn to_sse_event(event: &SessionEvent) -> Option<Event> {
    match event.data_json() {
        Ok(data) => Some(Event::default().event(event.name()).data(data)),
        Err(err) => {
            warn!(event = event.name(), error = %err, "failed to serialize SSE payload");
            None
        }
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Backpressure towards the room receiver; a slow client lags instead of buffering.
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let Some(event) = to_sse_event(&payload) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Lost room events are not replayed.
                            warn!(skipped, "room SSE stream lagging");
                            continue;
                        }
                    }
                }
            }
        }

        info!("room SSE stream disconnected");
    });

    // Dropped by axum on disconnect, which closes `tx` and ends the task above.
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::events::SongGuessedEvent;

    #[test]
    fn events_render_with_their_name() {
        let event = SessionEvent::SongGuessed(SongGuessedEvent {
            title: "Around the World".into(),
        });
        assert!(to_sse_event(&event).is_some());
        assert_eq!(event.name(), "song_guessed");
        assert_eq!(
            event.data_json().unwrap(),
            r#"{"title":"Around the World"}"#
        );
    }

    #[tokio::test]
    async fn subscribers_see_room_events() {
        let state = crate::state::tests::test_state();
        let mut receiver = subscribe_room(&state);
        crate::services::round_scheduler::announce_round(&state)
            .await
            .unwrap();
        assert!(matches!(
            receiver.recv().await,
            Ok(SessionEvent::RoundStarted(event)) if event.round == 1
        ));
    }
}
