use crate::response::{ApiOk, ApiResult};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::Json;
use medibot_core::{MediError, Message};
use medibot_session::{OpenedSession, Session, SessionFilter, UserConversation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CrearSalaBody {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "dolor", default)]
    pub symptom: String,
    #[serde(rename = "nombre", default)]
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct MensajeBody {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "message", default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct CerrarBody {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct MensajeReply {
    #[serde(rename = "respuesta")]
    pub reply: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

#[derive(Deserialize, Default)]
pub struct SessionQuery {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// A missing or malformed session id is the caller's fault and must come
/// back in the JSON error envelope, not as an extractor rejection.
fn parse_session_id(raw: Option<&str>) -> Result<Uuid, MediError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MediError::Validation("El parámetro sessionId es obligatorio".into()))?;
    Uuid::parse_str(raw)
        .map_err(|_| MediError::Validation(format!("El parámetro sessionId es inválido: {raw}")))
}

/// POST /api/sala/crearSala
pub async fn crear_sala(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearSalaBody>,
) -> ApiResult<OpenedSession> {
    let opened = state
        .manager
        .open_session(&body.user_id, &body.symptom, &body.display_name)
        .await?;
    Ok(ApiOk(opened))
}

/// POST /api/sala/mensaje
///
/// The turn runs in a spawned task so a client that disconnects mid-stream
/// cannot cancel a half-written turn; the handler only awaits the result.
pub async fn mensaje(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MensajeBody>,
) -> ApiResult<MensajeReply> {
    let session_id = parse_session_id(body.session_id.as_deref())?;
    let manager = state.manager.clone();
    let handle = tokio::spawn(async move {
        manager
            .post_message(session_id, &body.user_id, &body.text)
            .await
    });
    let reply = handle
        .await
        .map_err(|e| MediError::Upstream(format!("Turn task failed: {e}")))??;
    Ok(ApiOk(MensajeReply { reply }))
}

/// POST /api/sala/cerrar
pub async fn cerrar(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CerrarBody>,
) -> ApiResult<Session> {
    let session_id = parse_session_id(body.session_id.as_deref())?;
    let session = state.manager.close_session(session_id).await?;
    info!(session_id = %session.id, "Session closed");
    Ok(ApiOk(session))
}

/// GET /api/sala/sesiones
pub async fn sesiones(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Session>> {
    let sessions = state.manager.list_sessions(&SessionFilter::All).await?;
    Ok(ApiOk(sessions))
}

/// GET /api/sala/sesionesUsuario?userId=...
pub async fn sesiones_usuario(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<Session>> {
    if query.user_id.trim().is_empty() {
        return Err(MediError::Validation("El parámetro userId es obligatorio".into()).into());
    }
    let sessions = state
        .manager
        .list_sessions(&SessionFilter::ByUser(query.user_id))
        .await?;
    Ok(ApiOk(sessions))
}

/// GET /api/sala/conversacion?sessionId=...
pub async fn conversacion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Vec<Message>> {
    let session_id = parse_session_id(query.session_id.as_deref())?;
    let messages = state.manager.get_conversation(session_id).await?;
    Ok(ApiOk(messages))
}

/// GET /api/sala/conversacionesUsuario?userId=...
pub async fn conversaciones_usuario(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<UserConversation>> {
    let conversations = state.manager.conversations_by_user(&query.user_id).await?;
    Ok(ApiOk(conversations))
}
