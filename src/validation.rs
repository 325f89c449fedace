//!
//! # Field Validators
//!
//! Pure, synchronous checks composed in a fixed declared order. The first
//! failing check short-circuits with a single user-facing message; failures
//! are never aggregated into one response.

use crate::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    // The password rule is one lookahead regex upstream of us; the regex
    // crate has no lookahead, so each character class is checked separately.
    static ref PASSWORD_UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref PASSWORD_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref PASSWORD_SYMBOL: Regex = Regex::new(r"[!@#$%^&*]").unwrap();
    static ref PASSWORD_SHAPE: Regex = Regex::new(r"^[a-zA-Z0-9!@#$%^&*]{8,}$").unwrap();
}

pub const INVALID_EMAIL: &str = "E-mail inválido!";
pub const WEAK_PASSWORD: &str =
    "A senha deve conter no mínimo 8 caracteres, 1 número, 1 letra maiúscula e 1 símbolo.";
pub const INVALID_TASK_ID: &str = "ID de tarefa inválido!";

/// Checks an ordered list of `(value, message)` pairs and rejects with the
/// message of the first field that is absent or empty.
pub fn require_fields(fields: &[(Option<&str>, &str)]) -> Result<(), AppError> {
    for (value, message) in fields {
        if value.map_or(true, str::is_empty) {
            return Err(AppError::BadRequest((*message).to_string()));
        }
    }
    Ok(())
}

/// Validates email shape against the standard grammar.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err(AppError::BadRequest(INVALID_EMAIL.into()))
    }
}

/// Password strength: at least 8 characters, one uppercase letter, one digit
/// and one symbol from `!@#$%^&*`, with no characters outside that set.
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let strong = PASSWORD_SHAPE.is_match(password)
        && PASSWORD_UPPERCASE.is_match(password)
        && PASSWORD_DIGIT.is_match(password)
        && PASSWORD_SYMBOL.is_match(password);
    if strong {
        Ok(())
    } else {
        Err(AppError::BadRequest(WEAK_PASSWORD.into()))
    }
}

/// Parses a task id path parameter, rejecting malformed ids before any store
/// lookup happens.
pub fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(INVALID_TASK_ID.into()))
}
