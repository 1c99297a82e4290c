//! Online per-day metrics aggregation for the MediBot backend.
//!
//! Each calendar day (resolved in a fixed reference time zone) owns exactly
//! one [`DailyMetricBucket`]. Buckets are created lazily on the first turn of
//! a day and mutated additively on every subsequent turn using incremental
//! mean updates, so no historical data is ever re-scanned. The bucket
//! read-modify-write is a serialized critical section inside the store:
//! concurrent turns landing on the same day must not lose updates.

pub mod aggregator;
pub mod bucket;
pub mod report;
pub mod store;

pub use aggregator::{MetricsAggregator, MetricsSummary};
pub use bucket::{DailyMetricBucket, TurnSample};
pub use report::{top_medications, top_symptoms, MedicationCount, SymptomCount};
pub use store::{DateFilter, FileMetricsStore, InMemoryMetricsStore, MetricsStore};
