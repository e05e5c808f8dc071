//! Client-side ownership of one observed session.
//!
//! The controller holds the session record, the transcript, the connection
//! state, and the live stream handle, and is driven from a single owning
//! loop (the TUI). Handlers run one at a time in arrival order per source;
//! no ordering is guaranteed across the stream, poll, and command paths —
//! correctness comes from the idempotent merge entry points, not from
//! sequencing.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::stream::{ConnectionState, StreamEvent, TurnStream};
use crate::transcript::Transcript;
use crate::types::{Session, SessionCommand, SessionSnapshot};

/// Poll fallback period. A tuning constant, not a correctness property; the
/// stream delivers turns first in the common case and the poll backstops
/// missed deliveries.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Capacity of the stream-to-controller event channel.
const EVENT_CHANNEL_CAPACITY: usize = 100;

pub struct SessionController {
    api: ApiClient,
    session_id: Uuid,
    session: Option<Session>,
    transcript: Transcript,
    connection: ConnectionState,
    stream: Option<TurnStream>,
    events_tx: mpsc::Sender<StreamEvent>,
    /// Last server-pushed or transport notice for the status line.
    notice: Option<String>,
}

impl SessionController {
    /// Create a controller for `session_id`. No requests are made until
    /// [`Self::activate`]; the returned receiver is the owning loop's end of
    /// the stream channel.
    pub fn new(api: ApiClient, session_id: Uuid) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let controller = Self {
            api,
            session_id,
            session: None,
            transcript: Transcript::new(),
            connection: ConnectionState::Connecting,
            stream: None,
            events_tx,
            notice: None,
        };
        (controller, events_rx)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Initial load: fetch the snapshot, then open the turn stream resuming
    /// from the loaded cursor. The stream is opened even when the snapshot
    /// fetch fails, so a briefly unreachable server still self-heals.
    pub async fn activate(&mut self) -> Result<()> {
        let loaded = self.refresh().await;
        self.resubscribe();
        loaded
    }

    /// Fetch the full session + turns snapshot and apply it wholesale.
    pub async fn refresh(&mut self) -> Result<()> {
        let snapshot = self.api.get_session(self.session_id).await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Replace session record and transcript from a snapshot. The session
    /// record is swapped atomically, never field-by-field.
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        debug!(
            target: "parley::controller",
            session_id = %self.session_id,
            turns = snapshot.turns.len(),
            status = %snapshot.session.status,
            "applying snapshot"
        );
        self.transcript.replace_all(snapshot.turns);
        self.session = Some(snapshot.session);
    }

    /// Whether a lifecycle command is currently legal.
    pub fn command_enabled(&self, command: SessionCommand) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| command.is_enabled(&s.status))
    }

    /// Issue a lifecycle command, then unconditionally refetch the snapshot.
    /// The refetch outcome is independent of the command's own outcome: a
    /// failed command returns its error without touching state, and a failed
    /// refetch after a successful command is logged and left to the next
    /// poll tick or explicit refresh.
    pub async fn dispatch(&mut self, command: SessionCommand) -> Result<()> {
        if !self.command_enabled(command) {
            let status = self
                .session
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |s| s.status.to_string());
            return Err(Error::CommandNotAllowed {
                command: command.to_string(),
                status,
            });
        }

        self.api.dispatch(self.session_id, command).await?;
        info!(
            target: "parley::controller",
            session_id = %self.session_id,
            command = %command,
            "command accepted"
        );

        if let Err(e) = self.refresh().await {
            warn!(
                target: "parley::controller",
                session_id = %self.session_id,
                error = %e,
                "post-command refresh failed"
            );
        }
        Ok(())
    }

    /// Whether the poll fallback should fetch on the next tick. Only live
    /// sessions are polled; created and terminal sessions produce no new
    /// turns without a command, and commands refresh on their own.
    pub fn poll_due(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.status.is_live())
    }

    /// One poll fallback tick: a full snapshot refresh while the session is
    /// live, a no-op otherwise.
    pub async fn poll_tick(&mut self) -> Result<()> {
        if !self.poll_due() {
            return Ok(());
        }
        self.refresh().await
    }

    /// Apply one event from the stream channel. Returns true when the
    /// transcript grew (the viewport may want to follow).
    ///
    /// The event channel outlives individual subscriptions, so events from
    /// a stream closed by a session switch can still be queued. Turns for
    /// any session other than the current one are dropped.
    pub fn apply_stream_event(&mut self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::Turn(turn) => {
                if turn.session_id != self.session_id {
                    debug!(
                        target: "parley::controller",
                        session_id = %self.session_id,
                        turn_session_id = %turn.session_id,
                        "dropping turn from another session"
                    );
                    return false;
                }
                self.transcript.merge_turn(turn)
            }
            StreamEvent::Connection(state) => {
                self.connection = state;
                false
            }
            StreamEvent::ServerError(detail) => {
                self.notice = Some(detail);
                false
            }
        }
    }

    /// Move to a different session: close the active stream, reset all
    /// per-session state including the cursor, then load and resubscribe.
    pub async fn switch_session(&mut self, session_id: Uuid) -> Result<()> {
        info!(
            target: "parley::controller",
            from = %self.session_id,
            to = %session_id,
            "switching session"
        );
        self.stream = None;
        self.session_id = session_id;
        self.session = None;
        self.transcript.clear();
        self.connection = ConnectionState::Connecting;
        self.notice = None;
        self.activate().await
    }

    /// Close the turn stream and poll participation. Nothing outlives the
    /// owning view after this.
    pub fn shutdown(&mut self) {
        self.stream = None;
    }

    /// (Re)open the turn stream with the cursor from the current log. The
    /// previous subscription is closed first; there is never more than one
    /// live subscription per session.
    fn resubscribe(&mut self) {
        self.stream = None;
        self.connection = ConnectionState::Connecting;
        self.stream = Some(TurnStream::subscribe(
            self.api.clone(),
            self.session_id,
            self.transcript.cursor(),
            self.events_tx.clone(),
        ));
    }
}
