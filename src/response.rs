//! The JSON envelope every route answers with.
//!
//! `status` is 1 on success and 0 on failure regardless of the HTTP status
//! code, so clients check both.

use actix_web::http::StatusCode;
use serde::Serialize;

use crate::validation::FieldError;

/// Status used when a split payload fails validation. Kept apart from 400,
/// which means the operation itself failed.
pub const VALIDATION_FAILED: StatusCode = StatusCode::IM_A_TEAPOT;

#[derive(Debug, Default, Serialize)]
pub struct Envelope {
    pub status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            status: 1,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}
