use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::config::BasicAuthCredentials;
use crate::ErrorResponse;

pub const REALM: &str = "Secure Area";

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing authorization header")]
    Missing,
    #[error("Malformed basic authorization header")]
    Malformed,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((
                header::WWW_AUTHENTICATE,
                format!("Basic realm=\"{}\"", REALM),
            ))
            .json(ErrorResponse::new("Unauthorized", &self.to_string()))
    }
}

/// Decode `Authorization: Basic ...` into user and password.
fn extract_basic_credentials(req: &HttpRequest) -> Result<(String, String), AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    let encoded = value
        .strip_prefix("Basic ")
        .or_else(|| value.strip_prefix("basic "))
        .ok_or(AuthError::Malformed)?;
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    let (user, pass) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
    Ok((user.to_string(), pass.to_string()))
}

/// Check the request against the shared credential and return the user name.
pub fn validate_basic_auth(
    req: &HttpRequest,
    expected: &BasicAuthCredentials,
) -> Result<String, AuthError> {
    let (user, pass) = extract_basic_credentials(req)?;
    if user == expected.username && pass == expected.password {
        Ok(user)
    } else {
        log::warn!("Rejected basic auth attempt for user '{}' on {}", user, req.path());
        Err(AuthError::InvalidCredentials)
    }
}
