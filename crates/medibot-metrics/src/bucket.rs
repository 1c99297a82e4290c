use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One recorded turn: latency plus the locally-computed intent-failure flag
/// and the user's optional feedback for that turn.
#[derive(Debug, Clone)]
pub struct TurnSample {
    /// Wall-clock time around the agent call, in milliseconds.
    pub latency_ms: f64,
    /// Whether the reply text matched an "I don't understand" marker.
    pub intent_failed: bool,
    /// Feedback attached to this turn, if any.
    pub feedback: Option<String>,
}

/// The single aggregate metrics record for one calendar date.
///
/// Running means always equal the true arithmetic mean of all contributing
/// samples recorded so far; updates use the incremental formula
/// `new_mean = (old_mean * old_count + x) / (old_count + 1)` so historical
/// samples are never re-scanned. Field names on the wire keep the original
/// reporting contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetricBucket {
    /// Calendar date identifying the bucket ("YYYY-MM-DD" on the wire).
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    /// Total turns recorded on this date.
    #[serde(rename = "total_consultas")]
    pub consultations: u64,
    /// Running mean response latency in milliseconds.
    #[serde(rename = "promedio_respuesta_ms")]
    pub mean_latency_ms: f64,
    /// Count of turns whose reply matched an intent-failure marker.
    #[serde(rename = "fallos_intencion")]
    pub intent_failures: u64,
    /// Running mean satisfaction score on the 1-5 scale.
    #[serde(rename = "porcentaje_satisfaccion")]
    pub satisfaction_mean: f64,
    /// Number of satisfaction responses the mean is averaged over.
    /// Independent of `consultations`.
    #[serde(rename = "total_respuestas_satisfaccion", default)]
    pub satisfaction_samples: u64,
    /// Raw feedback strings in insertion order, one entry per turn
    /// (`null` placeholder for turns with no feedback), plus one entry per
    /// satisfaction report.
    #[serde(rename = "feedback_usuarios")]
    pub feedback: Vec<Option<String>>,
}

impl DailyMetricBucket {
    /// Creates the bucket for `date` from its first recorded turn.
    pub fn first(date: NaiveDate, sample: TurnSample) -> Self {
        Self {
            date,
            consultations: 1,
            mean_latency_ms: sample.latency_ms,
            intent_failures: u64::from(sample.intent_failed),
            satisfaction_mean: 0.0,
            satisfaction_samples: 0,
            feedback: vec![normalize_feedback(sample.feedback)],
        }
    }

    /// Folds one more turn into the running aggregates.
    pub fn apply_turn(&mut self, sample: TurnSample) {
        let count = self.consultations as f64;
        self.mean_latency_ms = (self.mean_latency_ms * count + sample.latency_ms) / (count + 1.0);
        self.consultations += 1;
        if sample.intent_failed {
            self.intent_failures += 1;
        }
        self.feedback.push(normalize_feedback(sample.feedback));
    }

    /// Folds one satisfaction response into the running satisfaction mean
    /// and returns the updated mean.
    ///
    /// The satisfaction mean is keyed on its own sample counter, distinct
    /// from the consultation count. The feedback text is appended
    /// unconditionally.
    pub fn apply_satisfaction(&mut self, feedback: String, score: f64) -> f64 {
        let samples = self.satisfaction_samples as f64;
        self.satisfaction_mean = (self.satisfaction_mean * samples + score) / (samples + 1.0);
        self.satisfaction_samples += 1;
        self.feedback.push(Some(feedback));
        self.satisfaction_mean
    }
}

/// Empty feedback collapses to the `null` placeholder, so the feedback list
/// keeps a one-to-one correspondence between turns and entries.
fn normalize_feedback(feedback: Option<String>) -> Option<String> {
    feedback.filter(|f| !f.is_empty())
}
