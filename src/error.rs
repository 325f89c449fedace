//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. Every handler returns `Result<_, AppError>` and recovers at
//! its own boundary; no error crosses a request boundary unhandled.
//!
//! `AppError` implements `actix_web::error::ResponseError` so application
//! errors convert into HTTP responses with a stable JSON `message` field.
//! `From` implementations for `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError` allow conversion with the `?` operator. Store errors
//! are mapped at the call site so each endpoint keeps its own user-facing
//! message; the real error detail is logged server-side only.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;

/// Represents all request-level failure states of the application.
///
/// Each variant carries the short human-readable message returned to the
/// client in the response body's `message` field.
#[derive(Debug)]
pub enum AppError {
    /// Missing/malformed input, invalid id shape, or a failed validation rule (HTTP 400).
    BadRequest(String),
    /// Missing, invalid, or expired session token (HTTP 401).
    Unauthorized(String),
    /// Authenticated but not the owner of the addressed resource (HTTP 403).
    Forbidden(String),
    /// Resource absent, or a search that matched nothing (HTTP 404).
    NotFound(String),
    /// Uniqueness violation on a business key. Deliberately surfaced as
    /// HTTP 400, not 409: all business-rule rejections use 400 uniformly.
    Conflict(String),
    /// Unexpected store/crypto failure (HTTP 500). The message is generic;
    /// the underlying cause is logged, never echoed to the caller.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            AppError::Unauthorized(msg) => {
                HttpResponse::Unauthorized().json(json!({ "message": msg }))
            }
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({ "message": msg })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "message": msg })),
            AppError::Internal(msg) => {
                HttpResponse::InternalServerError().json(json!({ "message": msg }))
            }
        }
    }
}

/// Converts JWT processing failures into the uniform invalid-token rejection.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::Unauthorized("Token inválido ou expirado!".into())
    }
}

/// Hashing/verification failures are internal: a malformed stored hash is a
/// server-side defect, not a client error.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        log::error!("bcrypt failure: {}", error);
        AppError::Internal("Erro interno do servidor!".into())
    }
}

/// True when the store rejected a write due to a unique constraint. The
/// application-level existence pre-checks are an optimization only; this is
/// the authoritative conflict signal.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}

/// True when the store rejected a write due to a foreign key constraint
/// (e.g. deleting a user who still owns tasks).
pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map_or(false, |db| db.is_foreign_key_violation())
}
