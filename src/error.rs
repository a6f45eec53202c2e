use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::document::DocumentError;
use crate::hotel::directory::HotelError;
use crate::storage::StoreError;
use crate::submission::validation::ValidationErrors;
use crate::ErrorResponse;

/// Errors surfaced by the submission endpoints.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("malformed request: {0}")]
    MalformedInput(String),
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("hotel '{0}' not found")]
    HotelNotFound(String),
    #[error("submission '{0}' not found")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("{0}")]
    Disabled(String),
    #[error("document could not be rendered: {0}")]
    Render(#[from] DocumentError),
}

impl From<HotelError> for SubmissionError {
    fn from(e: HotelError) -> Self {
        match e {
            HotelError::NotFound(key) => Self::HotelNotFound(key),
            HotelError::Store(e) => Self::Storage(e),
        }
    }
}

impl ResponseError for SubmissionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::HotelNotFound(_) | Self::NotFound(_) | Self::Disabled(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::MalformedInput(detail) => {
                ErrorResponse::bad_request("Ungültige Formulardaten - JSON-Objekt erwartet")
                    .with_error_type("validation")
                    .with_details(serde_json::json!(detail))
            }
            Self::Validation(errors) => {
                ErrorResponse::bad_request("Ungültige Formulardaten - Validation Error")
                    .with_error_type("validation")
                    .with_details(serde_json::to_value(errors).unwrap_or_default())
            }
            Self::HotelNotFound(key) => {
                ErrorResponse::not_found(&format!("Hotel '{}' nicht gefunden", key))
            }
            Self::NotFound(id) => {
                ErrorResponse::not_found(&format!("Meldeschein '{}' nicht gefunden", id))
            }
            Self::Disabled(message) => ErrorResponse::not_found(message),
            Self::Storage(e) => {
                log::error!("Submission storage failed: {}", e);
                ErrorResponse::internal_error("Fehler beim Verarbeiten des Meldescheins")
                    .with_error_type("server")
            }
            Self::Render(e) => {
                log::error!("PDF generation failed: {}", e);
                ErrorResponse::internal_error("Fehler bei der PDF-Generierung")
                    .with_error_type("server")
            }
        };
        HttpResponse::build(self.status_code()).json(body.with_message_as_error())
    }
}
