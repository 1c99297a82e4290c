use crate::response::{ApiOk, ApiResult};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use medibot_core::MediError;
use medibot_metrics::{
    top_medications, top_symptoms, DailyMetricBucket, DateFilter, MedicationCount, MetricsSummary,
    SymptomCount,
};
use medibot_session::SessionFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_TOP_K: usize = 10;

#[derive(Deserialize)]
pub struct FeedbackBody {
    #[serde(default)]
    pub feedback: String,
    /// Accepted as raw JSON so a non-numeric score is a validation error
    /// instead of a deserialization rejection.
    #[serde(rename = "satisfaccion")]
    pub satisfaction: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct FeedbackReply {
    #[serde(rename = "porcentaje_satisfaccion")]
    pub satisfaction_mean: f64,
}

#[derive(Deserialize, Default)]
pub struct MetricaQuery {
    #[serde(rename = "fecha")]
    pub date: Option<String>,
    #[serde(rename = "desde")]
    pub from: Option<String>,
    #[serde(rename = "hasta")]
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct MetricaReply {
    #[serde(rename = "dias")]
    pub days: Vec<DailyMetricBucket>,
    #[serde(rename = "resumen")]
    pub summary: MetricsSummary,
}

#[derive(Deserialize, Default)]
pub struct TopQuery {
    #[serde(rename = "limite")]
    pub limit: Option<usize>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, MediError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        MediError::Validation(format!("Fecha inválida: {raw}, use el formato YYYY-MM-DD"))
    })
}

impl MetricaQuery {
    fn into_filter(self) -> Result<DateFilter, MediError> {
        match (self.date, self.from, self.to) {
            (Some(date), None, None) => Ok(DateFilter::Exact(parse_date(&date)?)),
            (None, Some(from), Some(to)) => Ok(DateFilter::Range {
                from: parse_date(&from)?,
                to: parse_date(&to)?,
            }),
            (None, None, None) => Ok(DateFilter::All),
            _ => Err(MediError::Validation(
                "Indique fecha, o desde y hasta juntos".into(),
            )),
        }
    }
}

/// POST /api/sala/feedback
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FeedbackBody>,
) -> ApiResult<FeedbackReply> {
    let score = body
        .satisfaction
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| {
            MediError::Validation("La calificación de satisfacción debe ser un número".into())
        })?;
    let mean = state.metrics.record_satisfaction(&body.feedback, score).await?;
    Ok(ApiOk(FeedbackReply {
        satisfaction_mean: mean,
    }))
}

/// GET /api/sala/metrica?fecha=... | ?desde=...&hasta=...
pub async fn metrica(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricaQuery>,
) -> ApiResult<MetricaReply> {
    let filter = query.into_filter()?;
    let (days, summary) = state.metrics.query(&filter).await?;
    Ok(ApiOk(MetricaReply { days, summary }))
}

/// GET /api/sala/getDolorFrecuentes?limite=...
pub async fn dolores_frecuentes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Vec<SymptomCount>> {
    let sessions = state.manager.list_sessions(&SessionFilter::All).await?;
    let ranked = top_symptoms(
        sessions.iter().map(|s| s.symptom.as_str()),
        query.limit.unwrap_or(DEFAULT_TOP_K),
    );
    Ok(ApiOk(ranked))
}

/// GET /api/sala/getMedicamentosBuscados?limite=...
pub async fn medicamentos_buscados(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Vec<MedicationCount>> {
    let entries = state.search_log.read_all().await?;
    let ranked = top_medications(
        entries.iter().flat_map(|e| e.matched.iter().map(String::as_str)),
        query.limit.unwrap_or(DEFAULT_TOP_K),
    );
    Ok(ApiOk(ranked))
}
