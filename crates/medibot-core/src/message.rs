use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user describing symptoms.
    User,
    /// The conversational agent's reply.
    Bot,
}

/// A single message exchanged within a consultation session.
///
/// Messages are immutable once written. Within a session they are totally
/// ordered by timestamp, and every user message is immediately followed by
/// the bot message that answers it, except when the agent call failed after
/// the user turn was already persisted (the documented orphan case).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for this message.
    pub id: Uuid,
    /// The session this message belongs to.
    pub session_id: Uuid,
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub text: String,
    /// UTC timestamp of when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with the given role, text, and session ID.
    pub fn new(role: Role, text: impl Into<String>, session_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(text: impl Into<String>, session_id: Uuid) -> Self {
        Self::new(Role::User, text, session_id)
    }

    /// Creates a new message with [`Role::Bot`].
    pub fn bot(text: impl Into<String>, session_id: Uuid) -> Self {
        Self::new(Role::Bot, text, session_id)
    }
}
