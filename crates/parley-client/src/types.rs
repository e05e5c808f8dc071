//! Data model for the debate session service.
//!
//! Everything here is a point-in-time snapshot of server-owned state. The
//! client never mutates a [`Session`] field-by-field or edits a [`Turn`]
//! after it has been observed; refreshes replace whole records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle status of a debate session, as reported by the server.
///
/// The client never computes transitions itself; it gates commands on the
/// reported status and otherwise treats it as opaque. Unrecognized values
/// are preserved in [`SessionStatus::Other`] so a newer server does not
/// break older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    Created,
    Running,
    Stopping,
    Stopped,
    Completed,
    Failed,
    Canceled,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(s) => s,
        }
    }

    /// True while the server may still produce new turns.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    /// True for statuses no command transitions out of, except `failed`
    /// which is recoverable via retry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(value: SessionStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribution of a turn. Two debaters and a judge, with unknown actor
/// strings carried through for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Actor {
    DebaterA,
    DebaterB,
    Judge,
    Other(String),
}

impl Actor {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DebaterA => "debater_a",
            Self::DebaterB => "debater_b",
            Self::Judge => "judge",
            Self::Other(s) => s,
        }
    }

    /// Short label for the transcript gutter.
    pub fn label(&self) -> &str {
        match self {
            Self::DebaterA => "A",
            Self::DebaterB => "B",
            Self::Judge => "Judge",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Actor {
    fn from(value: String) -> Self {
        match value.as_str() {
            "debater_a" => Self::DebaterA,
            "debater_b" => Self::DebaterB,
            "judge" => Self::Judge,
            _ => Self::Other(value),
        }
    }
}

impl From<Actor> for String {
    fn from(value: Actor) -> Self {
        value.as_str().to_string()
    }
}

/// One debate session, server-owned and client-cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub topic: String,
    pub status: SessionStatus,
    pub next_round: u32,
    pub next_actor: Actor,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-item shape returned by `GET /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub topic: String,
    pub status: SessionStatus,
    pub next_round: u32,
    pub next_actor: Actor,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
    pub completed_rounds: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable utterance within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub session_id: Uuid,
    pub round: u32,
    pub actor: Actor,
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Sort key giving the transcript its total order: timestamps first,
    /// ids break ties from coarse clocks.
    pub fn sort_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

/// Full snapshot from `GET /sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: Session,
    pub turns: Vec<Turn>,
}

/// The five lifecycle commands a client can issue against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCommand {
    Start,
    Resume,
    Stop,
    Cancel,
    Retry,
}

impl SessionCommand {
    pub const ALL: [Self; 5] = [
        Self::Start,
        Self::Resume,
        Self::Stop,
        Self::Cancel,
        Self::Retry,
    ];

    /// Path segment under `POST /sessions/{id}/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Cancel => "cancel",
            Self::Retry => "retry",
        }
    }

    /// Whether the command is legal from the given status. This is the only
    /// transition knowledge the client carries; the resulting status always
    /// comes back from the server.
    pub fn is_enabled(self, status: &SessionStatus) -> bool {
        match self {
            Self::Start => matches!(status, SessionStatus::Created),
            Self::Resume => matches!(status, SessionStatus::Stopped | SessionStatus::Failed),
            Self::Stop => matches!(status, SessionStatus::Running),
            Self::Cancel => !matches!(
                status,
                SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Canceled
            ),
            Self::Retry => matches!(status, SessionStatus::Failed),
        }
    }
}

impl std::fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Who the judge scored as the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    A,
    B,
    Tie,
}

impl Winner {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::Tie => "tie",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "tie" => Some(Self::Tie),
            _ => None,
        }
    }
}

/// Judge verdict carried in a judge turn's metadata map.
///
/// The metadata map is loosely typed on the wire, so this is an explicit
/// narrowing: every field is individually validated and the projection as a
/// whole is absent unless all of them check out.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub winner: Winner,
    pub score_a: u8,
    pub score_b: u8,
    pub summary: String,
    pub no_new_arguments: bool,
}

impl Verdict {
    pub fn from_metadata(metadata: &Map<String, Value>) -> Option<Self> {
        let winner = Winner::parse(metadata.get("winner")?.as_str()?)?;
        let score_a = score_field(metadata.get("score_a")?)?;
        let score_b = score_field(metadata.get("score_b")?)?;
        let summary = metadata.get("summary")?.as_str()?.to_string();
        let no_new_arguments = metadata
            .get("no_new_substantive_arguments")?
            .as_bool()?;

        Some(Self {
            winner,
            score_a,
            score_b,
            summary,
            no_new_arguments,
        })
    }
}

fn score_field(value: &Value) -> Option<u8> {
    let n = value.as_i64()?;
    if (0..=10).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(entries: Value) -> Map<String, Value> {
        match entries {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn status_round_trips_unknown_values() {
        let status: SessionStatus = serde_json::from_value(json!("arbitrating")).unwrap();
        assert_eq!(status, SessionStatus::Other("arbitrating".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("arbitrating"));

        let known: SessionStatus = serde_json::from_value(json!("stopping")).unwrap();
        assert_eq!(known, SessionStatus::Stopping);
        assert!(known.is_live());
        assert!(!known.is_terminal());
    }

    #[test]
    fn command_gating_matches_lifecycle_table() {
        use SessionCommand::*;
        use SessionStatus::*;

        let cases = [
            (Created, vec![Start, Cancel]),
            (Running, vec![Stop, Cancel]),
            (Stopping, vec![Cancel]),
            (Stopped, vec![Resume, Cancel]),
            (Completed, vec![]),
            (Failed, vec![Resume, Retry]),
            (Canceled, vec![]),
        ];

        for (status, enabled) in cases {
            for command in SessionCommand::ALL {
                assert_eq!(
                    command.is_enabled(&status),
                    enabled.contains(&command),
                    "{command} from {status}"
                );
            }
        }
    }

    #[test]
    fn unknown_status_only_allows_cancel() {
        let status = SessionStatus::Other("arbitrating".to_string());
        for command in SessionCommand::ALL {
            assert_eq!(
                command.is_enabled(&status),
                command == SessionCommand::Cancel
            );
        }
    }

    #[test]
    fn verdict_projects_fully_typed_metadata() {
        let meta = metadata(json!({
            "winner": "a",
            "score_a": 8,
            "score_b": 6,
            "summary": "A carried the evidence.",
            "no_new_substantive_arguments": true,
            "unrelated": {"nested": true},
        }));

        let verdict = Verdict::from_metadata(&meta).unwrap();
        assert_eq!(verdict.winner, Winner::A);
        assert_eq!(verdict.score_a, 8);
        assert_eq!(verdict.score_b, 6);
        assert_eq!(verdict.summary, "A carried the evidence.");
        assert!(verdict.no_new_arguments);
    }

    #[test]
    fn verdict_rejects_missing_or_mistyped_fields() {
        let missing = metadata(json!({"winner": "b", "score_a": 5}));
        assert!(Verdict::from_metadata(&missing).is_none());

        let mistyped = metadata(json!({
            "winner": "b",
            "score_a": "five",
            "score_b": 5,
            "summary": "text",
            "no_new_substantive_arguments": false,
        }));
        assert!(Verdict::from_metadata(&mistyped).is_none());

        let out_of_range = metadata(json!({
            "winner": "tie",
            "score_a": 11,
            "score_b": 5,
            "summary": "text",
            "no_new_substantive_arguments": false,
        }));
        assert!(Verdict::from_metadata(&out_of_range).is_none());
    }

    #[test]
    fn turn_deserializes_service_payload() {
        let turn: Turn = serde_json::from_value(json!({
            "id": "4a4f8a2e-48f6-4f2a-9f53-0a54cf2f3f10",
            "session_id": "9c0b3a51-7b84-4a9f-9a3e-2f4f7f3f0a54",
            "round": 2,
            "actor": "debater_b",
            "content": "On the contrary...",
            "model": "deepseek-chat",
            "usage": {"completion_tokens": 120},
            "metadata": {},
            "created_at": "2026-03-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(turn.actor, Actor::DebaterB);
        assert_eq!(turn.round, 2);
        assert_eq!(turn.actor.label(), "B");
    }
}
