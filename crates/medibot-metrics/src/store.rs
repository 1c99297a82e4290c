use crate::bucket::{DailyMetricBucket, TurnSample};
use async_trait::async_trait;
use chrono::NaiveDate;
use medibot_core::{MediError, MediResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

/// Date criterion for metric queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    /// Every bucket in the store.
    All,
    /// Exactly one calendar date.
    Exact(NaiveDate),
    /// Inclusive date range.
    Range { from: NaiveDate, to: NaiveDate },
}

impl DateFilter {
    /// Whether a bucket dated `date` matches this filter.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Exact(d) => date == *d,
            DateFilter::Range { from, to } => date >= *from && date <= *to,
        }
    }
}

/// Persistence boundary for day buckets.
///
/// `record_turn` and `record_satisfaction` are atomically-consistent
/// read-modify-writes against the identified bucket: implementations must
/// serialize concurrent updates to the same date so no turn is lost.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Upserts today's bucket with one turn: creates it on the first turn of
    /// the day, otherwise applies the incremental update. Returns the bucket
    /// after the update.
    async fn record_turn(
        &self,
        date: NaiveDate,
        sample: TurnSample,
    ) -> MediResult<DailyMetricBucket>;

    /// Folds a satisfaction response into the bucket for `date` and returns
    /// the updated satisfaction mean. Fails with `NotFound` when no bucket
    /// exists for that date yet.
    async fn record_satisfaction(
        &self,
        date: NaiveDate,
        feedback: String,
        score: f64,
    ) -> MediResult<f64>;

    /// All buckets matching `filter`, descending by date.
    async fn query(&self, filter: &DateFilter) -> MediResult<Vec<DailyMetricBucket>>;
}

fn no_bucket_for(date: NaiveDate) -> MediError {
    MediError::NotFound(format!(
        "No se encontró registro de métricas para la fecha {date}"
    ))
}

/// In-memory metrics store. The write lock is the critical section that
/// serializes same-day upserts.
pub struct InMemoryMetricsStore {
    buckets: RwLock<HashMap<NaiveDate, DailyMetricBucket>>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsStore for InMemoryMetricsStore {
    async fn record_turn(
        &self,
        date: NaiveDate,
        sample: TurnSample,
    ) -> MediResult<DailyMetricBucket> {
        let mut buckets = self.buckets.write().await;
        let bucket = match buckets.get_mut(&date) {
            Some(bucket) => {
                bucket.apply_turn(sample);
                bucket.clone()
            }
            None => {
                let bucket = DailyMetricBucket::first(date, sample);
                buckets.insert(date, bucket.clone());
                bucket
            }
        };
        Ok(bucket)
    }

    async fn record_satisfaction(
        &self,
        date: NaiveDate,
        feedback: String,
        score: f64,
    ) -> MediResult<f64> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.get_mut(&date).ok_or_else(|| no_bucket_for(date))?;
        Ok(bucket.apply_satisfaction(feedback, score))
    }

    async fn query(&self, filter: &DateFilter) -> MediResult<Vec<DailyMetricBucket>> {
        let buckets = self.buckets.read().await;
        let mut matching: Vec<DailyMetricBucket> = buckets
            .values()
            .filter(|b| filter.matches(b.date))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matching)
    }
}

/// File-backed metrics store: one JSON document per calendar date.
///
/// A single mutex guards every read-modify-write so concurrent turns landing
/// on the same day cannot interleave between the read and the write.
pub struct FileMetricsStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMetricsStore {
    pub async fn new(dir: PathBuf) -> MediResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn bucket_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{date}.json"))
    }

    async fn read_bucket(&self, date: NaiveDate) -> MediResult<Option<DailyMetricBucket>> {
        let path = self.bucket_path(date);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let bucket: DailyMetricBucket = serde_json::from_str(&data)
            .map_err(|e| MediError::Store(format!("invalid bucket document for {date}: {e}")))?;
        Ok(Some(bucket))
    }

    async fn write_bucket(&self, bucket: &DailyMetricBucket) -> MediResult<()> {
        let json = serde_json::to_string_pretty(bucket)?;
        tokio::fs::write(self.bucket_path(bucket.date), json).await?;
        Ok(())
    }
}

#[async_trait]
impl MetricsStore for FileMetricsStore {
    async fn record_turn(
        &self,
        date: NaiveDate,
        sample: TurnSample,
    ) -> MediResult<DailyMetricBucket> {
        let _guard = self.write_lock.lock().await;
        let bucket = match self.read_bucket(date).await? {
            Some(mut bucket) => {
                bucket.apply_turn(sample);
                bucket
            }
            None => DailyMetricBucket::first(date, sample),
        };
        self.write_bucket(&bucket).await?;
        Ok(bucket)
    }

    async fn record_satisfaction(
        &self,
        date: NaiveDate,
        feedback: String,
        score: f64,
    ) -> MediResult<f64> {
        let _guard = self.write_lock.lock().await;
        let mut bucket = self
            .read_bucket(date)
            .await?
            .ok_or_else(|| no_bucket_for(date))?;
        let mean = bucket.apply_satisfaction(feedback, score);
        self.write_bucket(&bucket).await?;
        Ok(mean)
    }

    async fn query(&self, filter: &DateFilter) -> MediResult<Vec<DailyMetricBucket>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut matching = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            let Ok(date) = stem.parse::<NaiveDate>() else {
                continue;
            };
            if !filter.matches(date) {
                continue;
            }
            if let Some(bucket) = self.read_bucket(date).await? {
                matching.push(bucket);
            }
        }
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matching)
    }
}
