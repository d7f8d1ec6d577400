//! Mapping of provisioning failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spawner_common::ErrorBody;

use crate::domain::ProvisionError;

/// Handler error: `NotFound` is a 404, everything else a 500, both with an
/// `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub ProvisionError);

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ProvisionError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        }
        (status, Json(ErrorBody::new(self.0.to_string()))).into_response()
    }
}
