use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medibot_core::MediError;
use serde::Serialize;
use tracing::error;

/// Handler result type: success becomes the `OK` envelope, failure the
/// `Error` one.
pub type ApiResult<T> = Result<ApiOk<T>, ApiError>;

/// Successful payload, serialized as `{"status": "OK", "data": ...}`.
pub struct ApiOk<T>(pub T);

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        Json(serde_json::json!({
            "status": "OK",
            "data": self.0,
        }))
        .into_response()
    }
}

/// Failure payload, serialized as `{"status": "Error", "message": ...}`.
///
/// Internal errors (upstream, store, IO) keep their detail in the log only;
/// the caller sees a fixed generic message.
pub struct ApiError(pub MediError);

impl From<MediError> for ApiError {
    fn from(err: MediError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MediError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MediError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            other => {
                error!(error = %other, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({
                "status": "Error",
                "message": message,
            })),
        )
            .into_response()
    }
}
