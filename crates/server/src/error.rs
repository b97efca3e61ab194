//! Mapping of [`TitlecardError`] onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use titlecard_common::error::TitlecardError;

/// A request failure, rendered as `{"detail": "..."}` with a status chosen by
/// error kind.
#[derive(Debug)]
pub struct ApiError(pub TitlecardError);

impl From<TitlecardError> for ApiError {
    fn from(err: TitlecardError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind.
pub fn status_for(err: &TitlecardError) -> StatusCode {
    match err {
        TitlecardError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        TitlecardError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TitlecardError::Fetch { .. } | TitlecardError::Encode { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        TitlecardError::Unsupported { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_client_error() {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        } else {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        }
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}
