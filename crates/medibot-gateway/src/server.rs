use crate::{meds, metrics, sessions};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use medibot_meds::{MedicationService, SearchLogStore};
use medibot_metrics::MetricsAggregator;
use medibot_session::SessionManager;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub metrics: Arc<MetricsAggregator>,
    pub meds: Arc<MedicationService>,
    pub search_log: Arc<dyn SearchLogStore>,
}

/// The main gateway server.
pub struct GatewayServer;

impl GatewayServer {
    pub fn build(
        manager: Arc<SessionManager>,
        metrics: Arc<MetricsAggregator>,
        meds: Arc<MedicationService>,
        search_log: Arc<dyn SearchLogStore>,
    ) -> Router {
        let state = Arc::new(AppState {
            manager,
            metrics,
            meds,
            search_log,
        });

        Router::new()
            .route("/api/sala/crearSala", post(sessions::crear_sala))
            .route("/api/sala/mensaje", post(sessions::mensaje))
            .route("/api/sala/cerrar", post(sessions::cerrar))
            .route("/api/sala/feedback", post(metrics::feedback))
            .route("/api/sala/sesiones", get(sessions::sesiones))
            .route("/api/sala/sesionesUsuario", get(sessions::sesiones_usuario))
            .route("/api/sala/conversacion", get(sessions::conversacion))
            .route(
                "/api/sala/conversacionesUsuario",
                get(sessions::conversaciones_usuario),
            )
            .route("/api/sala/metrica", get(metrics::metrica))
            .route(
                "/api/sala/getDolorFrecuentes",
                get(metrics::dolores_frecuentes),
            )
            .route(
                "/api/sala/getMedicamentosBuscados",
                get(metrics::medicamentos_buscados),
            )
            .route("/api/MediBot/getUsoComun", get(meds::uso_comun))
            .route("/api/MediBot/medicamento", get(meds::medicamento))
            .route("/api/MediBot/receta", get(meds::receta))
            .route("/health", get(health_handler))
            .with_state(state)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "medibot"}))
}
