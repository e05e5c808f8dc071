//! HTTP client for the debate session service.

use reqwest::header;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Session, SessionCommand, SessionSnapshot, SessionSummary};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Reply to start/resume: whether the server enqueued a worker step.
/// Informational only; the follow-up snapshot refresh is the source of truth.
#[derive(Debug, Deserialize)]
struct EnqueueReply {
    enqueued: bool,
}

/// Thin typed wrapper over the session service's REST surface.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn sessions_url(&self, suffix: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().push("sessions");
            for segment in suffix.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Fetch the full session + turns snapshot.
    pub async fn get_session(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let url = self.sessions_url(&session_id.to_string())?;
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// List session summaries, most recently updated first.
    pub async fn list_sessions(&self, limit: u32) -> Result<Vec<SessionSummary>> {
        let mut url = self.sessions_url("")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Create a new session for the given topic.
    pub async fn create_session(
        &self,
        topic: &str,
        settings: Map<String, Value>,
    ) -> Result<Session> {
        let url = self.sessions_url("")?;
        let body = serde_json::json!({ "topic": topic, "settings": settings });
        let response = self.http.post(url).json(&body).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fire one lifecycle command. Success is pass/fail only; callers follow
    /// up with a snapshot refresh rather than trusting any reply payload.
    pub async fn dispatch(&self, session_id: Uuid, command: SessionCommand) -> Result<()> {
        let url = self.sessions_url(&format!("{session_id}/{}", command.endpoint()))?;
        let response = self.http.post(url).send().await?;
        let response = check_status(response).await?;

        if matches!(command, SessionCommand::Start | SessionCommand::Resume) {
            if let Ok(reply) = response.json::<EnqueueReply>().await {
                debug!(
                    target: "parley::api",
                    %session_id,
                    command = %command,
                    enqueued = reply.enqueued,
                    "lifecycle command accepted"
                );
            }
        }
        Ok(())
    }

    /// Open the server-push turn channel for a session, optionally resuming
    /// after a known turn id. Returns the raw response; the caller parses
    /// the SSE body.
    pub async fn open_event_stream(
        &self,
        session_id: Uuid,
        after: Option<Uuid>,
    ) -> Result<reqwest::Response> {
        let mut url = self.sessions_url(&format!("{session_id}/events"))?;
        if let Some(after) = after {
            url.query_pairs_mut()
                .append_pair("after", &after.to_string());
        }
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
