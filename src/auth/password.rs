use crate::error::AppError;
use bcrypt::{hash, verify};

// Work factor matches the original deployment's salt rounds.
const BCRYPT_COST: u32 = 10;

// Failures convert through `From<bcrypt::BcryptError>`, which logs the cause
// and surfaces the generic internal-error message.

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, BCRYPT_COST)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
