use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Maps every failure mode `/address` and `/payout` can hit onto an
/// HTTP status, mirroring the `web.HTTP*` exceptions raised throughout
/// `original_source`'s `services/signer/main.py`.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payouts paused")]
    Paused,
    #[error("no deposit addresses available")]
    NoAddressAvailable,
    #[error(transparent)]
    Kv(#[from] trustora_kv::KvError),
    #[error(transparent)]
    Db(#[from] trustora_db::DbError),
    #[error(transparent)]
    Chain(#[from] trustora_chain::ChainError),
    #[error(transparent)]
    Keys(#[from] trustora_keys::KeysError),
    #[error(transparent)]
    Core(#[from] trustora_core::CoreError),
}

impl IntoResponse for SignerError {
    fn into_response(self) -> Response {
        use trustora_kv::KvError;

        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Paused | Self::NoAddressAvailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Kv(KvError::ReplayDetected) => StatusCode::UNAUTHORIZED,
            Self::Kv(
                KvError::HardMaxExceeded
                | KvError::ApprovalRequired
                | KvError::DailyMaxExceeded
                | KvError::HourlyCountExceeded,
            ) => StatusCode::FORBIDDEN,
            Self::Kv(KvError::Redis(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Db(db_err) if db_err.is_unique_violation() => StatusCode::CONFLICT,
            Self::Db(trustora_db::DbError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Db(_) | Self::Chain(_) | Self::Keys(_) | Self::Core(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::warn!(error = %self, "signer request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
