use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mg_core::Error;
use mg_pipeline::StageError;
use serde_json::json;

/// A stage failure rendered as `{"stage", "error", "message"}`.
#[derive(Debug)]
pub struct ApiError {
    pub stage: &'static str,
    pub error: Error,
}

impl ApiError {
    pub fn new(stage: &'static str, error: Error) -> Self {
        Self { stage, error }
    }

    /// A request body that did not deserialize, tagged with the stage it was meant for.
    pub fn bad_body(stage: &'static str, rejection: JsonRejection) -> Self {
        Self::new(stage, Error::InvalidRequest(rejection.body_text()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            Error::InvalidQuota(_) | Error::MissingProcessField { .. } | Error::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::MalformedCoverContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_external() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StageError> for ApiError {
    fn from(err: StageError) -> Self {
        Self::new(err.stage, err.source)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ {} failed: {}", self.stage, self.error);
        } else {
            tracing::warn!("{} rejected: {}", self.stage, self.error);
        }
        let body = json!({
            "stage": self.stage,
            "error": self.error.kind(),
            "message": self.error.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
