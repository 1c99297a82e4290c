use crate::session::Session;
use crate::store::{SessionFilter, SessionStore};
use crate::transcript::TranscriptStore;
use chrono::{DateTime, Utc};
use medibot_agent::AgentClient;
use medibot_core::{MediError, MediResult, Message};
use medibot_metrics::MetricsAggregator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Spanish-language reply markers treated as an intent failure.
///
/// The heuristic is evaluated on the response text only, case-sensitively.
/// Whether substring matching stays the long-term failure signal is an open
/// question; until then the markers are fixed.
const INTENT_FAILURE_MARKERS: [&str; 2] = ["no entiendo", "no puedo"];

/// Whether a bot reply counts as an intent failure.
pub fn intent_failed(reply: &str) -> bool {
    INTENT_FAILURE_MARKERS.iter().any(|m| reply.contains(m))
}

/// Result of opening a session: the new identifier plus the agent's first
/// reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "respuesta")]
    pub reply: String,
}

/// One session together with its full ordered transcript.
#[derive(Debug, Clone, Serialize)]
pub struct UserConversation {
    #[serde(flatten)]
    pub session: Session,
    #[serde(rename = "mensajes")]
    pub messages: Vec<Message>,
}

/// Owns session lifecycle and message sequencing.
///
/// Per-session ordering comes from write-before-call / write-after-call:
/// the user message is persisted before the agent is invoked and the bot
/// message after it returns. No lock is needed for this; the store only has
/// to preserve insertion/timestamp order on read.
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    transcript: Arc<dyn TranscriptStore>,
    agent: Arc<dyn AgentClient>,
    metrics: Arc<MetricsAggregator>,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        transcript: Arc<dyn TranscriptStore>,
        agent: Arc<dyn AgentClient>,
        metrics: Arc<MetricsAggregator>,
    ) -> Self {
        Self {
            sessions,
            transcript,
            agent,
            metrics,
        }
    }

    /// Opens a session and runs its first turn.
    ///
    /// The opening message is synthesized from the caller's name and
    /// symptom. If the agent call fails the session (and the synthesized
    /// user turn) remain persisted — a documented partial-success state.
    /// The first turn records no metrics: there is no caller-perceived
    /// latency to attribute to it.
    pub async fn open_session(
        &self,
        user_id: &str,
        symptom: &str,
        display_name: &str,
    ) -> MediResult<OpenedSession> {
        let user_id = user_id.trim();
        let symptom = symptom.trim();
        let display_name = display_name.trim();
        if user_id.is_empty() || symptom.is_empty() || display_name.is_empty() {
            return Err(MediError::Validation("Faltan campos requeridos".into()));
        }

        let session = Session::new(user_id, symptom);
        self.sessions.create(&session).await?;
        info!(session_id = %session.id, user_id, "Session created");

        let greeting = format!("Hola, mi nombre es {display_name} y me duele {symptom}");
        self.transcript
            .append(&Message::user(&greeting, session.id))
            .await?;

        let reply = self.agent.invoke(session.id, &greeting).await.map_err(|e| {
            warn!(session_id = %session.id, error = %e, "Agent call failed on opening turn");
            e
        })?;

        self.transcript
            .append(&Message::bot(&reply, session.id))
            .await?;

        Ok(OpenedSession {
            session_id: session.id,
            started_at: session.started_at,
            reply,
        })
    }

    /// Runs one turn on an existing session and returns the bot's reply.
    ///
    /// The user message is persisted before the agent call, so the
    /// transcript keeps the user's input even when the call later fails;
    /// that already-persisted turn is not rolled back.
    pub async fn post_message(
        &self,
        session_id: Uuid,
        user_id: &str,
        text: &str,
    ) -> MediResult<String> {
        if user_id.trim().is_empty() || text.trim().is_empty() {
            return Err(MediError::Validation("Faltan campos requeridos".into()));
        }
        self.sessions
            .get(session_id)
            .await?
            .ok_or_else(|| MediError::NotFound(format!("Sesión no encontrada: {session_id}")))?;

        self.transcript
            .append(&Message::user(text, session_id))
            .await?;

        let started = Instant::now();
        let reply = self.agent.invoke(session_id, text).await.map_err(|e| {
            warn!(session_id = %session_id, error = %e, "Agent call failed, user turn kept");
            e
        })?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.transcript
            .append(&Message::bot(&reply, session_id))
            .await?;

        self.metrics
            .record_turn(latency_ms, intent_failed(&reply), None)
            .await;

        Ok(reply)
    }

    /// Closes a session by setting its end timestamp. Closing twice keeps
    /// the first timestamp.
    pub async fn close_session(&self, session_id: Uuid) -> MediResult<Session> {
        self.sessions.close(session_id, Utc::now()).await
    }

    /// Sessions matching `filter`, newest first.
    pub async fn list_sessions(&self, filter: &SessionFilter) -> MediResult<Vec<Session>> {
        self.sessions.list(filter).await
    }

    /// The full transcript of one session, ascending by timestamp.
    pub async fn get_conversation(&self, session_id: Uuid) -> MediResult<Vec<Message>> {
        self.transcript.read(session_id).await
    }

    /// Every session of a user (newest first), each with its ordered
    /// transcript. A user without sessions gets an empty list, not an error.
    pub async fn conversations_by_user(&self, user_id: &str) -> MediResult<Vec<UserConversation>> {
        if user_id.trim().is_empty() {
            return Err(MediError::Validation(
                "El parámetro userId es obligatorio".into(),
            ));
        }
        let sessions = self
            .sessions
            .list(&SessionFilter::ByUser(user_id.to_string()))
            .await?;

        let mut conversations = Vec::with_capacity(sessions.len());
        for session in sessions {
            let messages = self.transcript.read(session.id).await?;
            conversations.push(UserConversation { session, messages });
        }
        Ok(conversations)
    }
}
