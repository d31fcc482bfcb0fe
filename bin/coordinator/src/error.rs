use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use trustora_core::CoreError;
use trustora_db::DbError;
use trustora_kv::KvError;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not confirmed yet")]
    NotConfirmed,
    #[error("upstream signer error: {0}")]
    Signer(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Kv(#[from] KvError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotConfirmed => (StatusCode::ACCEPTED, "tap again to confirm".to_owned()),
            Self::Signer(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            Self::Db(DbError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Db(DbError::Conflict(msg)) => (StatusCode::CONFLICT, msg.clone()),
            Self::Db(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Self::Kv(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Self::Core(CoreError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Self::Core(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Http(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
        };
        if status.is_server_error() {
            tracing::error!(error = %message, "coordinator request failed");
        } else {
            tracing::warn!(error = %message, "coordinator request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
