//! Error type shared by every pipeline. Each variant is one flavour of the
//! user-visible "operation failed" outcome; nothing is retried.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub const NO_INPUT_PROMPT: &str = "Upload a file or paste some text to start.";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{}", NO_INPUT_PROMPT)]
  NoInput,
  #[error("Unsupported file type: {0}")]
  UnsupportedFile(String),
  #[error("Uploaded text is not valid UTF-8")]
  InvalidUtf8,
  #[error("PDF extraction failed: {0}")]
  Pdf(String),
  #[error("Upload failed: {0}")]
  Upload(String),
  #[error("{0}")]
  Validation(String),
  #[error("Unknown language: {0}")]
  UnknownLanguage(String),
  #[error("Translation is not configured on this server")]
  TranslationUnavailable,
  #[error("Translation failed: {0}")]
  Translation(String),
  #[error("Speech synthesis failed: {0}")]
  Speech(String),
  #[error("Internal error: {0}")]
  Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::NoInput => "no_input",
      AppError::UnsupportedFile(_) => "unsupported_file",
      AppError::InvalidUtf8 => "invalid_utf8",
      AppError::Pdf(_) => "pdf",
      AppError::Upload(_) => "upload",
      AppError::Validation(_) => "validation",
      AppError::UnknownLanguage(_) => "unknown_language",
      AppError::TranslationUnavailable => "translation_unavailable",
      AppError::Translation(_) => "translation",
      AppError::Speech(_) => "speech",
      AppError::Internal(_) => "internal",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      AppError::NoInput | AppError::Upload(_) | AppError::UnknownLanguage(_) => StatusCode::BAD_REQUEST,
      AppError::UnsupportedFile(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      AppError::InvalidUtf8 | AppError::Pdf(_) | AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::TranslationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Translation(_) | AppError::Speech(_) => StatusCode::BAD_GATEWAY,
      AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub error: &'static str,
  pub message: String,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    warn!(target: "smarttext", kind = self.kind(), %status, error = %self, "Request failed");
    (status, Json(ErrorOut { error: self.kind(), message: self.to_string() })).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_input_carries_the_prompt() {
    let e = AppError::NoInput;
    assert_eq!(e.to_string(), NO_INPUT_PROMPT);
    assert_eq!(e.status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn upstream_failures_are_bad_gateway() {
    assert_eq!(AppError::Translation("down".into()).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::Speech("down".into()).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::UnsupportedFile("image/png".into()).kind(), "unsupported_file");
  }
}
