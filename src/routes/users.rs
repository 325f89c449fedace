use crate::{
    auth::{hash_password, AuthenticatedUser},
    error::{is_unique_violation, AppError},
    models::{UserPayload, UserView},
    validation,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Self-service model: user routes may only address the caller's own id.
/// The path segment is compared against the authenticated identity's
/// canonical string; there is no admin or override role.
fn enforce_self(path_id: &str, auth: AuthenticatedUser, denial: &str) -> Result<(), AppError> {
    if path_id != auth.id.to_string() {
        return Err(AppError::Forbidden(denial.to_string()));
    }
    Ok(())
}

/// Presence checks plus the email grammar, in declared order. Password
/// strength is checked separately: it comes only after the email-uniqueness
/// gate, so a taken email wins over a weak password.
fn validate_user_identity(payload: &UserPayload) -> Result<(), AppError> {
    validation::require_fields(&[
        (payload.first_name.as_deref(), "O campo nome é obrigatório!"),
        (
            payload.last_name.as_deref(),
            "O campo sobrenome é obrigatório!",
        ),
        (payload.email.as_deref(), "O campo email é obrigatório!"),
        (payload.password.as_deref(), "O campo senha é obrigatório!"),
    ])?;
    validation::validate_email(payload.email.as_deref().unwrap_or_default().trim())
}

/// Register a new user
///
/// Validates the payload, enforces email uniqueness and persists the record
/// with the password stored only as a bcrypt hash. The response body carries
/// a `UserView` projection; the hash never leaves the server.
#[post("")]
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<UserPayload>,
) -> Result<impl Responder, AppError> {
    validate_user_identity(&payload)?;
    let email = payload.email.as_deref().unwrap_or_default().trim();

    // Pre-check is an optimization; the unique index on users.email is the
    // authoritative conflict signal under concurrent registrations.
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("email uniqueness check failed: {}", e);
            AppError::Internal("Erro ao criar usuário!".into())
        })?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email já cadastrado!".into()));
    }

    validation::validate_password_strength(payload.password.as_deref().unwrap_or_default())?;
    let hash = hash_password(payload.password.as_deref().unwrap_or_default())?;

    let user = sqlx::query_as::<_, UserView>(
        "INSERT INTO users (id, first_name, last_name, email, password)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, first_name, last_name, email",
    )
    .bind(Uuid::new_v4())
    .bind(payload.first_name.as_deref().unwrap_or_default())
    .bind(payload.last_name.as_deref().unwrap_or_default())
    .bind(email)
    .bind(hash)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email já cadastrado!".into())
        } else {
            log::error!("user insert failed: {}", e);
            AppError::Internal("Erro ao criar usuário!".into())
        }
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Usuário criado com sucesso!",
        "user": user,
    })))
}

/// Fetch the caller's own record.
#[get("")]
pub async fn get_self(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, UserView>(
        "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
    )
    .bind(auth.id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("user lookup failed: {}", e);
        AppError::Internal("Erro ao buscar usuário!".into())
    })?;

    let user = user.ok_or_else(|| AppError::NotFound("Usuário não encontrado!".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Fetch the caller's record by path id. The path id must equal the caller's
/// own id; any other id is forbidden regardless of whether it exists.
#[get("/{id}")]
pub async fn get_user_by_id(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    enforce_self(
        &path,
        auth,
        "Você não tem permissão para visualizar essas informações.",
    )?;

    let user = sqlx::query_as::<_, UserView>(
        "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
    )
    .bind(auth.id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("user lookup failed: {}", e);
        AppError::Internal("Erro ao buscar usuário!".into())
    })?;

    let user = user.ok_or_else(|| AppError::NotFound("Usuário não encontrado!".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Update the caller's own record.
///
/// There are no partial-field semantics: all four fields are overwritten on
/// every call and the supplied password is re-hashed unconditionally.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    auth: AuthenticatedUser,
    payload: web::Json<UserPayload>,
) -> Result<impl Responder, AppError> {
    enforce_self(
        &path,
        auth,
        "Você não tem permissão para atualizar essas informações.",
    )?;
    validate_user_identity(&payload)?;
    validation::validate_password_strength(payload.password.as_deref().unwrap_or_default())?;
    let email = payload.email.as_deref().unwrap_or_default().trim();

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("user lookup failed: {}", e);
            AppError::Internal("Erro ao atualizar usuário!".into())
        })?;
    if existing.is_none() {
        return Err(AppError::NotFound("Usuário não encontrado!".into()));
    }

    let hash = hash_password(payload.password.as_deref().unwrap_or_default())?;

    let result = sqlx::query(
        "UPDATE users SET first_name = $1, last_name = $2, email = $3, password = $4 WHERE id = $5",
    )
    .bind(payload.first_name.as_deref().unwrap_or_default())
    .bind(payload.last_name.as_deref().unwrap_or_default())
    .bind(email)
    .bind(hash)
    .bind(auth.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email já cadastrado!".into())
        } else {
            log::error!("user update failed: {}", e);
            AppError::Internal("Erro ao atualizar usuário!".into())
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Erro ao atualizar usuário!".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Usuário atualizado com sucesso!" })))
}

/// Delete the caller's own record. Owned tasks are never cascade-deleted;
/// if the store refuses the delete because tasks still reference the user,
/// the failure surfaces as the generic update-path 400.
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    enforce_self(
        &path,
        auth,
        "Você não tem permissão para deletar essas informações.",
    )?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("user lookup failed: {}", e);
            AppError::Internal("Erro ao deletar usuário!".into())
        })?;
    if existing.is_none() {
        return Err(AppError::NotFound("Usuário não encontrado!".into()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(auth.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            if crate::error::is_foreign_key_violation(&e) {
                AppError::BadRequest("Erro ao deletar usuário!".into())
            } else {
                log::error!("user delete failed: {}", e);
                AppError::Internal("Erro ao deletar usuário!".into())
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Erro ao deletar usuário!".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Usuário deletado com sucesso!" })))
}
