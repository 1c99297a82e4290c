use crate::response::{ApiOk, ApiResult};
use crate::server::AppState;
use axum::extract::{Query, State};
use medibot_core::MediError;
use medibot_meds::{Medication, PrescriptionInfo};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct UsoComunQuery {
    #[serde(rename = "uso_comun", default)]
    pub common_use: String,
}

#[derive(Deserialize, Default)]
pub struct NombreQuery {
    #[serde(rename = "nombre", default)]
    pub name: String,
}

fn medication_not_found(name: &str) -> MediError {
    MediError::NotFound(format!("No se encontró el medicamento: {name}"))
}

/// GET /api/MediBot/getUsoComun?uso_comun=...
///
/// An empty match list is a successful response; the search is still
/// written to the audit log either way.
pub async fn uso_comun(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsoComunQuery>,
) -> ApiResult<Vec<Medication>> {
    let matches = state.meds.search_by_common_use(&query.common_use).await?;
    Ok(ApiOk(matches))
}

/// GET /api/MediBot/medicamento?nombre=...
pub async fn medicamento(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NombreQuery>,
) -> ApiResult<Medication> {
    let found = state
        .meds
        .find_by_name(&query.name)?
        .ok_or_else(|| medication_not_found(&query.name))?;
    Ok(ApiOk(found))
}

/// GET /api/MediBot/receta?nombre=...
pub async fn receta(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NombreQuery>,
) -> ApiResult<PrescriptionInfo> {
    let info = state
        .meds
        .requires_prescription(&query.name)?
        .ok_or_else(|| medication_not_found(&query.name))?;
    Ok(ApiOk(info))
}
