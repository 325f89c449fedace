use crate::{
    auth::AuthenticatedUser,
    error::{is_unique_violation, AppError},
    models::{
        task::{created_stamp, updated_stamp, INVALID_STATUS},
        Task, TaskPayload, TaskSearchQuery, TaskStatus,
    },
    validation,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

/// Create a task owned by the caller.
///
/// Title uniqueness is enforced per owner (the pre-check is an optimization;
/// the store's unique index is authoritative). The status label, when
/// supplied, is validated up front so an unknown label is a 400, never a
/// store-level failure. `createdAt` is stamped `DD/MM/YYYY`.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    payload: web::Json<TaskPayload>,
) -> Result<impl Responder, AppError> {
    validation::require_fields(&[
        (payload.title.as_deref(), "O campo título é obrigatório!"),
        (
            payload.description.as_deref(),
            "O campo descrição é obrigatório!",
        ),
    ])?;
    let status = TaskStatus::from_payload(payload.status.as_deref())?;
    let title = payload.title.as_deref().unwrap_or_default();

    let duplicate =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tasks WHERE user_id = $1 AND title = $2")
            .bind(auth.id)
            .bind(title)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("task title check failed: {}", e);
                AppError::Internal("Erro interno do servidor!".into())
            })?;
    if duplicate.is_some() {
        return Err(AppError::Conflict("Tarefa já cadastrada!".into()));
    }

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, status, user_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(payload.description.as_deref().unwrap_or_default())
    .bind(status.as_label())
    .bind(auth.id)
    .bind(created_stamp())
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Tarefa já cadastrada!".into())
        } else {
            log::error!("task insert failed: {}", e);
            AppError::Internal("Erro interno do servidor!".into())
        }
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Tarefa criada com sucesso!",
        "task": task,
    })))
}

/// List all of the caller's tasks, in store order.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks =
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1"))
            .bind(auth.id)
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("task list failed: {}", e);
                AppError::Internal("Erro interno do servidor!".into())
            })?;

    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}

/// Search the caller's tasks by exact status and/or creation date.
///
/// An empty result set is a 404, not an empty 200 list: "nothing matched" is
/// reported distinctly from a successful listing. Recognized status labels
/// are canonicalized before matching so legacy spellings still hit.
#[get("/search")]
#[allow(unused_assignments)]
pub async fn search_tasks(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<TaskSearchQuery>,
) -> Result<impl Responder, AppError> {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
    let mut param = 2;

    if query.status.is_some() {
        sql.push_str(&format!(" AND status = ${param}"));
        param += 1;
    }
    if query.date.is_some() {
        sql.push_str(&format!(" AND created_at = ${param}"));
    }

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(auth.id);
    if let Some(status) = &query.status {
        let label = TaskStatus::from_label(status)
            .map(|s| s.as_label().to_string())
            .unwrap_or_else(|| status.clone());
        query_builder = query_builder.bind(label);
    }
    if let Some(date) = &query.date {
        query_builder = query_builder.bind(date.clone());
    }

    let tasks = query_builder.fetch_all(pool.get_ref()).await.map_err(|e| {
        log::error!("task search failed: {}", e);
        AppError::Internal("Erro interno do servidor!".into())
    })?;

    if tasks.is_empty() {
        return Err(AppError::NotFound(
            "Nenhuma tarefa encontrada com os critérios de busca fornecidos.".into(),
        ));
    }
    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetch one of the caller's tasks. The owner filter is part of the query, so
/// another user's task id is indistinguishable from a nonexistent one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = validation::parse_task_id(&path)?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(task_id)
    .bind(auth.id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("task lookup failed: {}", e);
        AppError::Internal("Erro interno do servidor!".into())
    })?;

    let task = task.ok_or_else(|| AppError::NotFound("Tarefa não encontrada!".into()))?;
    Ok(HttpResponse::Ok().json(task))
}

/// Update one of the caller's tasks.
///
/// The path id's shape is validated before any store access. Title,
/// description and status are all overwritten; the new title must not belong
/// to another of the caller's tasks. `updatedAt` is stamped
/// `DD/MM/YYYY HH:mm:ss`.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<TaskPayload>,
) -> Result<impl Responder, AppError> {
    let task_id = validation::parse_task_id(&path)?;
    let status = payload
        .status
        .as_deref()
        .and_then(TaskStatus::from_label)
        .ok_or_else(|| AppError::BadRequest(INVALID_STATUS.into()))?;
    validation::require_fields(&[
        (payload.title.as_deref(), "O campo título é obrigatório!"),
        (
            payload.description.as_deref(),
            "O campo descrição é obrigatório!",
        ),
    ])?;
    let title = payload.title.as_deref().unwrap_or_default();

    let existing =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(auth.id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("task lookup failed: {}", e);
                AppError::Internal("Erro interno do servidor!".into())
            })?;
    if existing.is_none() {
        return Err(AppError::NotFound("Tarefa não encontrada!".into()));
    }

    let same_title =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tasks WHERE user_id = $1 AND title = $2")
            .bind(auth.id)
            .bind(title)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("task title check failed: {}", e);
                AppError::Internal("Erro interno do servidor!".into())
            })?;
    if let Some(other_id) = same_title {
        if other_id != task_id {
            return Err(AppError::Conflict(
                "Já existe uma tarefa com este título!".into(),
            ));
        }
    }

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET title = $1, description = $2, status = $3, updated_at = $4
         WHERE id = $5 AND user_id = $6
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(title)
    .bind(payload.description.as_deref().unwrap_or_default())
    .bind(status.as_label())
    .bind(updated_stamp())
    .bind(task_id)
    .bind(auth.id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Já existe uma tarefa com este título!".into())
        } else {
            log::error!("task update failed: {}", e);
            AppError::Internal("Erro interno do servidor!".into())
        }
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tarefa atualizada com sucesso!",
        "task": task,
    })))
}

/// Delete one of the caller's tasks.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = validation::parse_task_id(&path)?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(auth.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            log::error!("task delete failed: {}", e);
            AppError::Internal("Erro interno do servidor!".into())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Tarefa não encontrada!".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Tarefa excluída com sucesso!" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::extractors::test_support::InjectUser;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool")
    }

    async fn task_app(
        caller: Uuid,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).service(
                web::scope("/tasks")
                    .wrap(InjectUser(caller))
                    .service(get_tasks)
                    .service(create_task)
                    .service(search_tasks)
                    .service(get_task)
                    .service(update_task)
                    .service(delete_task),
            ),
        )
        .await
    }

    #[actix_rt::test]
    async fn test_create_task_requires_title_then_description() {
        let app = task_app(Uuid::new_v4()).await;

        let req = test::TestRequest::post()
            .uri("/tasks")
            .set_json(json!({ "description": "D" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "O campo título é obrigatório!");

        let req = test::TestRequest::post()
            .uri("/tasks")
            .set_json(json!({ "title": "T1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "O campo descrição é obrigatório!");
    }

    #[actix_rt::test]
    async fn test_create_task_rejects_unknown_status_label() {
        let app = task_app(Uuid::new_v4()).await;

        let req = test::TestRequest::post()
            .uri("/tasks")
            .set_json(json!({ "title": "T1", "description": "D", "status": "bogus" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], INVALID_STATUS);
    }

    #[actix_rt::test]
    async fn test_update_task_rejects_malformed_id_before_store_access() {
        // The pool is lazy and would fail any query; reaching the store at
        // all would surface a 500, not the id-shape 400.
        let app = task_app(Uuid::new_v4()).await;

        let req = test::TestRequest::put()
            .uri("/tasks/not-an-id")
            .set_json(json!({ "title": "T1", "description": "D", "status": "Pendente" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "ID de tarefa inválido!");
    }

    #[actix_rt::test]
    async fn test_delete_and_get_reject_malformed_id() {
        let app = task_app(Uuid::new_v4()).await;

        for builder in [test::TestRequest::delete(), test::TestRequest::get()] {
            let req = builder.uri("/tasks/not-an-id").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "ID de tarefa inválido!");
        }
    }

    #[actix_rt::test]
    async fn test_update_task_requires_valid_status() {
        let app = task_app(Uuid::new_v4()).await;

        // Missing and unknown labels are both invalid on update.
        for body in [
            json!({ "title": "T1", "description": "D" }),
            json!({ "title": "T1", "description": "D", "status": "Feito" }),
        ] {
            let req = test::TestRequest::put()
                .uri(&format!("/tasks/{}", Uuid::new_v4()))
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], INVALID_STATUS);
        }
    }
}
