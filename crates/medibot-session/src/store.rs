use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medibot_core::{MediError, MediResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Which sessions a listing should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFilter {
    /// Every session in the store.
    All,
    /// Only sessions owned by the given user.
    ByUser(String),
}

impl SessionFilter {
    fn matches(&self, session: &Session) -> bool {
        match self {
            SessionFilter::All => true,
            SessionFilter::ByUser(user_id) => session.user_id == *user_id,
        }
    }
}

/// Persistence boundary for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &Session) -> MediResult<()>;
    async fn get(&self, id: Uuid) -> MediResult<Option<Session>>;
    /// Sets the end timestamp. A second close keeps the first timestamp.
    async fn close(&self, id: Uuid, ended_at: DateTime<Utc>) -> MediResult<Session>;
    /// Matching sessions, descending by start time.
    async fn list(&self, filter: &SessionFilter) -> MediResult<Vec<Session>>;
}

fn session_not_found(id: Uuid) -> MediError {
    MediError::NotFound(format!("Sesión no encontrada: {id}"))
}

fn sort_newest_first(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
}

/// In-memory session store, used by tests and single-process deployments.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> MediResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> MediResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id).cloned())
    }

    async fn close(&self, id: Uuid, ended_at: DateTime<Utc>) -> MediResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        if session.ended_at.is_none() {
            session.ended_at = Some(ended_at);
        }
        Ok(session.clone())
    }

    async fn list(&self, filter: &SessionFilter) -> MediResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<Session> = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }
}

/// File-based session store (one JSON document per session).
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub async fn new(dir: PathBuf) -> MediResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write(&self, session: &Session) -> MediResult<()> {
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(self.session_path(session.id), json).await?;
        Ok(())
    }

    async fn read(&self, id: Uuid) -> MediResult<Option<Session>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let session: Session = serde_json::from_str(&data)
            .map_err(|e| MediError::Store(format!("invalid session document {id}: {e}")))?;
        Ok(Some(session))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, session: &Session) -> MediResult<()> {
        self.write(session).await
    }

    async fn get(&self, id: Uuid) -> MediResult<Option<Session>> {
        self.read(id).await
    }

    async fn close(&self, id: Uuid, ended_at: DateTime<Utc>) -> MediResult<Session> {
        let mut session = self.read(id).await?.ok_or_else(|| session_not_found(id))?;
        if session.ended_at.is_none() {
            session.ended_at = Some(ended_at);
            self.write(&session).await?;
        }
        Ok(session)
    }

    async fn list(&self, filter: &SessionFilter) -> MediResult<Vec<Session>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut matching = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            let Ok(id) = Uuid::parse_str(stem) else {
                continue;
            };
            if let Some(session) = self.read(id).await? {
                if filter.matches(&session) {
                    matching.push(session);
                }
            }
        }
        sort_newest_first(&mut matching);
        Ok(matching)
    }
}
