use axum::{
  extract::{multipart::MultipartError, rejection::PathRejection},
  response::{IntoResponse, Response},
  http::StatusCode,
  Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure kinds raised by the file store and the track service.
#[derive(Error, Debug)]
pub enum ServiceError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Storage(String),

  #[error("Connection pool error: {0}")]
  Pool(#[from] r2d2::Error),

  #[error("SQLite error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Unknown(#[from] anyhow::Error),
}

impl ServiceError {
  pub fn track_not_found(track_id: i64) -> Self {
    ServiceError::NotFound(format!("Track not found with id: {}", track_id))
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
  message: String,
  name: String,
  status_code: u16
}

#[derive(Debug)]
pub enum ApiError {
  NotFoundError(String),
  ValidationError(String),
  PayloadTooLargeError(String),
  StorageError(String),
  UnknownError(anyhow::Error),
}

impl ApiError {
  fn render(status_code: StatusCode, name: &str, message: String) -> Response {
    (
      status_code,
      Json(
        ApiErrorResponse {
          message,
          name: name.to_owned(),
          status_code: status_code.as_u16(),
        }
      )
    ).into_response()
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFoundError(err_msg) => {
        ApiError::render(StatusCode::NOT_FOUND, "NotFoundError", err_msg)
      },
      ApiError::ValidationError(err_msg) => {
        ApiError::render(StatusCode::BAD_REQUEST, "ValidationError", err_msg)
      },
      ApiError::PayloadTooLargeError(err_msg) => {
        ApiError::render(StatusCode::PAYLOAD_TOO_LARGE, "PayloadTooLargeError", err_msg)
      },
      ApiError::StorageError(err_msg) => {
        tracing::error!(message = "storage error happened", error = err_msg.as_str());
        ApiError::render(StatusCode::INTERNAL_SERVER_ERROR, "StorageError", err_msg)
      },
      ApiError::UnknownError(err) => {
        tracing::error!(message = "unknown error happened", error = format!("{:#}", err));
        ApiError::render(
          StatusCode::INTERNAL_SERVER_ERROR,
          "UnknownError",
          "Something bad happened when processing your request".to_owned(),
        )
      }
    }
  }
}

impl From<ServiceError> for ApiError {
  fn from(err: ServiceError) -> Self {
    match err {
      ServiceError::Validation(err_msg) => ApiError::ValidationError(err_msg),
      ServiceError::NotFound(err_msg) => ApiError::NotFoundError(err_msg),
      ServiceError::Storage(err_msg) => ApiError::StorageError(err_msg),
      ServiceError::Pool(err) => ApiError::UnknownError(err.into()),
      ServiceError::Database(err) => ApiError::UnknownError(err.into()),
      ServiceError::Unknown(err) => ApiError::UnknownError(err),
    }
  }
}

impl From<MultipartError> for ApiError {
  fn from(err: MultipartError) -> Self {
    match err.status() {
      StatusCode::PAYLOAD_TOO_LARGE => {
        ApiError::PayloadTooLargeError(format!("Upload is too large: {}", err.body_text()))
      },
      _ => ApiError::ValidationError(format!("Malformed multipart request: {}", err.body_text())),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(err: PathRejection) -> Self {
    ApiError::ValidationError(format!("Invalid track id: {}", err.body_text()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn service_errors_map_to_status_codes() {
    let cases = [
      (ServiceError::Validation("Track title is required".to_owned()), StatusCode::BAD_REQUEST),
      (ServiceError::track_not_found(7), StatusCode::NOT_FOUND),
      (ServiceError::Storage("disk full".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
      (ServiceError::Unknown(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
      let response = ApiError::from(err).into_response();
      assert_eq!(response.status(), expected);
    }
  }

  #[test]
  fn payload_too_large_has_its_own_status() {
    let response = ApiError::PayloadTooLargeError("Upload is too large".to_owned()).into_response();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
  }

  #[test]
  fn not_found_message_names_the_id() {
    assert_eq!(ServiceError::track_not_found(42).to_string(), "Track not found with id: 42");
  }
}
