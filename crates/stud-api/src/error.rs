//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Business-rule violations; answered with 422 and one message per rule.
  #[error("{message}")]
  Validation { message: String, errors: Vec<String> },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Fatal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<stud_core::Error> for ApiError {
  fn from(e: stud_core::Error) -> Self {
    use stud_core::Error as E;
    match e {
      E::Validation { context, violations } => ApiError::Validation {
        message: context.to_owned(),
        errors:  violations.iter().map(ToString::to_string).collect(),
      },
      e @ (E::SubjectNotFound(_) | E::OwnerNotFound(_)) => ApiError::NotFound(e.to_string()),
      E::Fatal(m) => ApiError::Fatal(m),
      E::Store(e) => ApiError::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Validation { message, errors } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "message": message, "errors": errors }),
      ),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "message": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "message": m })),
      ApiError::Fatal(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": self.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use stud_core::validate::Violation;

  use super::*;

  #[test]
  fn validation_keeps_one_message_per_violation() {
    let err = ApiError::from(stud_core::Error::Validation {
      context:    "validation of subject for create failed",
      violations: vec![Violation::Missing("name"), Violation::Missing("sex")],
    });
    let ApiError::Validation { message, errors } = err else {
      panic!("expected a validation error");
    };
    assert_eq!(message, "validation of subject for create failed");
    assert_eq!(errors.len(), 2);
  }

  #[test]
  fn not_found_maps_to_404() {
    let resp = ApiError::from(stud_core::Error::SubjectNotFound(3)).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn fatal_maps_to_500() {
    let resp = ApiError::from(stud_core::Error::Fatal("broken".into())).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
