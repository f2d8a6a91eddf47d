//! RPC error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use idsync_service::ServiceError;
use idsync_store::StoreError;

/// What a failed RPC invocation answers with.
///
/// Skip conditions inside a sync pass are NOT errors; they come back as 200
/// with a descriptive message. Only malformed requests, unknown accounts,
/// and genuine service failures surface here.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    BadRequest(String),

    #[error("account not found: {0}")]
    NotFound(String),

    /// Re-verifying a VERIFIED account; answered as HTTP 409.
    #[error("Already Verified")]
    AlreadyVerified,

    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for RpcError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::AlreadyVerified => RpcError::AlreadyVerified,
            ServiceError::NotVerifiable(reason) => RpcError::BadRequest(reason),
            ServiceError::Store(StoreError::NotFound(key)) => RpcError::NotFound(key),
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl RpcError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyVerified => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "rpc invocation failed");
        }
        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_http_statuses() {
        let already: RpcError = ServiceError::AlreadyVerified.into();
        assert_eq!(already.status(), StatusCode::CONFLICT);

        let missing: RpcError =
            ServiceError::Store(StoreError::NotFound("u1".into())).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let refused: RpcError =
            ServiceError::NotVerifiable("no chaincode on file".into()).into();
        assert_eq!(refused.status(), StatusCode::BAD_REQUEST);

        let broken: RpcError =
            ServiceError::Store(StoreError::Backend("disk".into())).into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
