use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use bomdiff_utils::{BomDiffError, ErrorResponse};

/// Error returned by HTTP handlers, rendered as an [`ErrorResponse`] body
#[derive(Debug)]
pub struct ApiError(pub BomDiffError);

impl From<BomDiffError> for ApiError {
    fn from(error: BomDiffError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!(code = self.0.error_code(), error = %self.0, "Request failed");
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
