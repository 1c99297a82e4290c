use async_trait::async_trait;
use medibot_core::{MediError, MediResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use medibot_core::Message;

/// Append-only ordered record of messages keyed by session.
///
/// Messages are immutable once written; `read` returns them ascending by
/// timestamp. The store itself never interleaves sessions — each session's
/// transcript is an independent sequence.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(&self, message: &Message) -> MediResult<()>;
    async fn read(&self, session_id: Uuid) -> MediResult<Vec<Message>>;
}

fn sort_chronological(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

/// In-memory transcript store.
pub struct InMemoryTranscriptStore {
    messages: RwLock<HashMap<Uuid, Vec<Message>>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn append(&self, message: &Message) -> MediResult<()> {
        let mut messages = self.messages.write().await;
        messages
            .entry(message.session_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn read(&self, session_id: Uuid) -> MediResult<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut transcript = messages.get(&session_id).cloned().unwrap_or_default();
        sort_chronological(&mut transcript);
        Ok(transcript)
    }
}

/// File-based transcript store: one JSONL file per session, appended per
/// message.
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    pub async fn new(dir: PathBuf) -> MediResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn transcript_path(&self, session_id: Uuid) -> PathBuf {
        self.dir.join(format!("{session_id}.messages.jsonl"))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn append(&self, message: &Message) -> MediResult<()> {
        let path = self.transcript_path(message.session_id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read(&self, session_id: Uuid) -> MediResult<Vec<Message>> {
        let path = self.transcript_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let mut messages: Vec<Message> = data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MediError::Store(format!("invalid transcript line: {e}")))?;
        sort_chronological(&mut messages);
        Ok(messages)
    }
}
