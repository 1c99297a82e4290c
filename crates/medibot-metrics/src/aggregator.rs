use crate::bucket::{DailyMetricBucket, TurnSample};
use crate::store::{DateFilter, MetricsStore};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use medibot_core::{MediError, MediResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Reference zone in which "today" is resolved for day buckets.
pub const DEFAULT_ZONE: Tz = chrono_tz::America::Bogota;

/// Computed roll-up over a set of matching day buckets.
///
/// The latency and satisfaction fields are means of the per-day means, not
/// sample-weighted global means. That is the reporting contract consumers
/// already depend on and is reproduced as-is.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    /// Sum of consultation counts across matching days.
    #[serde(rename = "total_consultas")]
    pub consultations: u64,
    /// Mean of the per-day mean latencies.
    #[serde(rename = "promedio_respuesta_ms")]
    pub mean_latency_ms: f64,
    /// Sum of intent-failure counts.
    #[serde(rename = "fallos_intencion")]
    pub intent_failures: u64,
    /// Mean of the per-day satisfaction means.
    #[serde(rename = "porcentaje_satisfaccion")]
    pub satisfaction_mean: f64,
    /// Number of matching days.
    #[serde(rename = "total_dias")]
    pub days: usize,
}

impl MetricsSummary {
    /// Rolls up the given buckets. Empty input produces an all-zero summary.
    pub fn from_buckets(buckets: &[DailyMetricBucket]) -> Self {
        let days = buckets.len();
        let denom = days.max(1) as f64;
        Self {
            consultations: buckets.iter().map(|b| b.consultations).sum(),
            mean_latency_ms: buckets.iter().map(|b| b.mean_latency_ms).sum::<f64>() / denom,
            intent_failures: buckets.iter().map(|b| b.intent_failures).sum(),
            satisfaction_mean: buckets.iter().map(|b| b.satisfaction_mean).sum::<f64>() / denom,
            days,
        }
    }
}

/// Maintains the per-day rolling statistics behind a [`MetricsStore`].
pub struct MetricsAggregator {
    store: Arc<dyn MetricsStore>,
    zone: Tz,
}

impl MetricsAggregator {
    pub fn new(store: Arc<dyn MetricsStore>, zone: Tz) -> Self {
        Self { store, zone }
    }

    /// Aggregator pinned to the service's reference zone.
    pub fn with_default_zone(store: Arc<dyn MetricsStore>) -> Self {
        Self::new(store, DEFAULT_ZONE)
    }

    /// Today's calendar date in the reference zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }

    /// Records one turn into today's bucket.
    ///
    /// A metrics write failure is logged but never fails the turn that
    /// produced it; the chat reply has already been delivered.
    pub async fn record_turn(&self, latency_ms: f64, intent_failed: bool, feedback: Option<String>) {
        let date = self.today();
        let sample = TurnSample {
            latency_ms,
            intent_failed,
            feedback,
        };
        if let Err(e) = self.store.record_turn(date, sample).await {
            warn!(error = %e, %date, "Failed to record turn metrics");
        }
    }

    /// Records a satisfaction response for today and returns the updated
    /// running satisfaction mean.
    pub async fn record_satisfaction(&self, feedback: &str, score: f64) -> MediResult<f64> {
        if feedback.trim().is_empty() {
            return Err(MediError::Validation("El feedback es obligatorio".into()));
        }
        if !score.is_finite() || !(1.0..=5.0).contains(&score) {
            return Err(MediError::Validation(
                "La calificación de satisfacción debe estar entre 1 y 5".into(),
            ));
        }
        self.store
            .record_satisfaction(self.today(), feedback.to_string(), score)
            .await
    }

    /// All buckets matching `filter`, newest first, plus their roll-up.
    /// Fails with `NotFound` when nothing matches.
    pub async fn query(
        &self,
        filter: &DateFilter,
    ) -> MediResult<(Vec<DailyMetricBucket>, MetricsSummary)> {
        let buckets = self.store.query(filter).await?;
        if buckets.is_empty() {
            return Err(MediError::NotFound(
                "No se encontraron métricas para el criterio dado".into(),
            ));
        }
        let summary = MetricsSummary::from_buckets(&buckets);
        Ok((buckets, summary))
    }
}
