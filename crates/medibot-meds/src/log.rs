use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medibot_core::{MediError, MediResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Audit entry for one common-use search. Write-once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLogEntry {
    /// The searched term, trimmed and lowercased.
    #[serde(rename = "uso_buscado")]
    pub term: String,
    /// How many medications matched.
    #[serde(rename = "resultados")]
    pub result_count: usize,
    /// Display names of the matched medications.
    #[serde(rename = "medicamentos_encontrados")]
    pub matched: Vec<String>,
    #[serde(rename = "fecha")]
    pub timestamp: DateTime<Utc>,
}

impl SearchLogEntry {
    pub fn new(term: impl Into<String>, matched: Vec<String>) -> Self {
        Self {
            term: term.into(),
            result_count: matched.len(),
            matched,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only store for [`SearchLogEntry`] records.
#[async_trait]
pub trait SearchLogStore: Send + Sync {
    async fn append(&self, entry: SearchLogEntry) -> MediResult<()>;
    /// All entries in insertion order.
    async fn read_all(&self) -> MediResult<Vec<SearchLogEntry>>;
}

/// In-memory search log.
pub struct InMemorySearchLogStore {
    entries: RwLock<Vec<SearchLogEntry>>,
}

impl InMemorySearchLogStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemorySearchLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchLogStore for InMemorySearchLogStore {
    async fn append(&self, entry: SearchLogEntry) -> MediResult<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn read_all(&self) -> MediResult<Vec<SearchLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.clone())
    }
}

/// File-backed search log: a single JSONL file, appended per entry.
pub struct FileSearchLogStore {
    path: PathBuf,
}

impl FileSearchLogStore {
    pub async fn new(path: PathBuf) -> MediResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl SearchLogStore for FileSearchLogStore {
    async fn append(&self, entry: SearchLogEntry) -> MediResult<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_all(&self) -> MediResult<Vec<SearchLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&self.path).await?;
        data.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .map_err(|e| MediError::Store(format!("invalid search log line: {e}")))
            })
            .collect()
    }
}
