use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One consultation session, scoped by a single reported symptom.
///
/// Created on the first turn; the only mutation in normal operation is
/// setting `ended_at` on close. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque identifier generated on creation.
    pub id: Uuid,
    /// Owning user identifier.
    pub user_id: String,
    /// The symptom/topic string reported when the session was opened.
    #[serde(rename = "dolor")]
    pub symptom: String,
    /// When the session was opened.
    pub started_at: DateTime<Utc>,
    /// When the session was closed; `None` means "in progress".
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new in-progress session.
    pub fn new(user_id: impl Into<String>, symptom: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            symptom: symptom.into(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Whether the session is still in progress.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}
