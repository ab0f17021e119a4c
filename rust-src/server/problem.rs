//! Problem-details error responses.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::storage::StoreError;


pub type ApiResult<T> = Result<T, ApiProblem>;


#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    title: &'static str,
    detail: String,
    kind: &'static str,
    correlation_id: String,
}


impl ApiProblem {
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => Self::validation(e.message()),
            StoreError::NotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "Not found",
                "/problems/not-found",
                err.to_string(),
            ),
            StoreError::Corrupt { .. } => Self::server_side(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage corrupt",
                "/problems/storage-corrupt",
                err,
            ),
            StoreError::Unavailable { .. } | StoreError::Sqlite(_) => Self::server_side(
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage unavailable",
                "/problems/storage-unavailable",
                err,
            ),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
            "/problems/validation",
            detail,
        )
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(%detail, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "/problems/internal",
            detail,
        )
    }

    /// Keep the extractor's status (400 syntax, 415 content type, 422 data).
    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        Self::new(
            rejection.status(),
            "Invalid request body",
            "/problems/invalid-body",
            rejection.body_text(),
        )
    }

    pub fn from_form_rejection(rejection: FormRejection) -> Self {
        Self::new(
            rejection.status(),
            "Invalid request body",
            "/problems/invalid-body",
            rejection.body_text(),
        )
    }

    pub fn from_path_rejection(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }

    pub fn from_query_rejection(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }

    fn server_side(
        status: StatusCode,
        title: &'static str,
        kind: &'static str,
        err: StoreError,
    ) -> Self {
        error!(error = %err, "storage failure");
        Self::new(status, title, kind, err.to_string())
    }

    fn new(
        status: StatusCode,
        title: &'static str,
        kind: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            title,
            detail: detail.into(),
            kind,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }
}


#[derive(Debug, Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    status: u16,
    detail: String,
    correlation_id: String,
}


impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let payload = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            correlation_id: self.correlation_id,
        };

        let mut response = (self.status, Json(payload)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );

        response
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthKey, ValidationError};

    fn status_of(err: StoreError) -> StatusCode {
        ApiProblem::from_store(err).into_response().status()
    }

    #[test]
    fn test_store_error_status_mapping() {
        let not_found = StoreError::NotFound(MonthKey::new(2024, 3).unwrap());
        assert_eq!(status_of(not_found), StatusCode::NOT_FOUND);

        let invalid = StoreError::Validation(ValidationError::new("month must be between 1 and 12"));
        assert_eq!(status_of(invalid), StatusCode::UNPROCESSABLE_ENTITY);

        let corrupt = StoreError::Corrupt {
            path: "/tmp/pomo_data.json".into(),
            reason: "expected value".to_string(),
        };
        assert_eq!(status_of(corrupt), StatusCode::INTERNAL_SERVER_ERROR);

        let unavailable = StoreError::Unavailable {
            path: "/tmp/pomo_data.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(status_of(unavailable), StatusCode::SERVICE_UNAVAILABLE);
    }
}
