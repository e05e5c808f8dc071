//! Live turn subscription for one session.
//!
//! A [`TurnStream`] owns the server-push channel end to end: it opens the
//! SSE request with the resume cursor, forwards decoded turns and
//! connection-state transitions over an mpsc channel, and reconnects by
//! itself after transport drops. The owning view never resubscribes on a
//! transient drop, only on session switch or explicit reload.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::sse::{SseEvent, parse_sse_stream};
use crate::types::Turn;

/// Coarse health of the turn channel. Client-local and ephemeral; reset on
/// every new subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the subscription reports back to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Turn(Turn),
    Connection(ConnectionState),
    /// `error` events pushed by the server (e.g. unknown session).
    ServerError(String),
}

/// Delay between reconnect attempts after a transport drop.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Handle to the spawned subscription task. Dropping the handle tears the
/// subscription down on every exit path; at most one live subscription per
/// session is the owner's responsibility (close the old handle first).
#[derive(Debug)]
pub struct TurnStream {
    session_id: Uuid,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TurnStream {
    /// Spawn the subscription for `session_id`, resuming after the given
    /// turn id when present.
    pub fn subscribe(
        api: ApiClient,
        session_id: Uuid,
        after: Option<Uuid>,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            run_subscription(api, session_id, after, tx, task_cancel).await;
        });
        Self {
            session_id,
            cancel,
            handle,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Close the subscription deterministically.
    pub fn shutdown(self) {
        // Drop impl does the work.
    }
}

impl Drop for TurnStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
        debug!(target: "parley::stream", session_id = %self.session_id, "turn stream closed");
    }
}

async fn run_subscription(
    api: ApiClient,
    session_id: Uuid,
    mut after: Option<Uuid>,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
) {
    info!(target: "parley::stream", %session_id, ?after, "subscribing to turn stream");

    if send_event(&tx, StreamEvent::Connection(ConnectionState::Connecting))
        .await
        .is_err()
    {
        return;
    }

    loop {
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = api.open_event_stream(session_id, after) => result,
        };

        match response {
            Ok(response) => {
                if send_event(&tx, StreamEvent::Connection(ConnectionState::Connected))
                    .await
                    .is_err()
                {
                    return;
                }

                let mut events = parse_sse_stream(response.bytes_stream());
                loop {
                    let event = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        event = events.next() => event,
                    };

                    match event {
                        Some(Ok(event)) => {
                            if let Some(decoded) = decode_event(&event) {
                                if let StreamEvent::Turn(turn) = &decoded {
                                    after = Some(turn.id);
                                }
                                if send_event(&tx, decoded).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            warn!(target: "parley::stream", %session_id, error = %e, "turn stream errored");
                            break;
                        }
                        None => {
                            warn!(target: "parley::stream", %session_id, "turn stream closed by server");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(target: "parley::stream", %session_id, error = %e, "failed to open turn stream");
            }
        }

        if send_event(&tx, StreamEvent::Connection(ConnectionState::Reconnecting))
            .await
            .is_err()
        {
            return;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> Result<(), ()> {
    // A closed receiver means the owning view is gone; stop quietly.
    tx.send(event).await.map_err(|_| ())
}

/// Decode one wire event. Malformed payloads are dropped with a log line so
/// a bad event never takes the subscription down.
fn decode_event(event: &SseEvent) -> Option<StreamEvent> {
    match event.event_type.as_deref() {
        Some("turn") => match serde_json::from_str::<Turn>(&event.data) {
            Ok(turn) => Some(StreamEvent::Turn(turn)),
            Err(e) => {
                warn!(target: "parley::stream", error = %e, "dropping malformed turn event");
                None
            }
        },
        Some("error") => {
            let detail = serde_json::from_str::<serde_json::Value>(&event.data)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or_else(|| event.data.clone());
            Some(StreamEvent::ServerError(detail))
        }
        other => {
            debug!(target: "parley::stream", event_type = ?other, "ignoring unknown event type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sse(event_type: &str, data: serde_json::Value) -> SseEvent {
        SseEvent {
            event_type: Some(event_type.to_string()),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn decodes_turn_events() {
        let event = sse(
            "turn",
            json!({
                "id": "4a4f8a2e-48f6-4f2a-9f53-0a54cf2f3f10",
                "session_id": "9c0b3a51-7b84-4a9f-9a3e-2f4f7f3f0a54",
                "round": 1,
                "actor": "judge",
                "content": "Winner: A",
                "model": null,
                "usage": {},
                "metadata": {},
                "created_at": "2026-03-01T12:00:00Z"
            }),
        );

        match decode_event(&event) {
            Some(StreamEvent::Turn(turn)) => assert_eq!(turn.round, 1),
            other => panic!("expected turn, got {other:?}"),
        }
    }

    #[test]
    fn malformed_turn_payload_is_dropped() {
        let event = sse("turn", json!({"id": "not-a-uuid"}));
        assert_eq!(decode_event(&event), None);

        let garbage = SseEvent {
            event_type: Some("turn".to_string()),
            data: "{not json".to_string(),
            id: None,
        };
        assert_eq!(decode_event(&garbage), None);
    }

    #[test]
    fn server_error_events_carry_detail() {
        let event = sse("error", json!({"detail": "Session not found"}));
        assert_eq!(
            decode_event(&event),
            Some(StreamEvent::ServerError("Session not found".to_string()))
        );
    }

    #[test]
    fn unknown_event_types_are_ignored() {
        let event = sse("heartbeat", json!({}));
        assert_eq!(decode_event(&event), None);
    }
}
