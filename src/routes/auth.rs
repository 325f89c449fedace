use crate::{
    auth::{verify_password, LoginRequest, TokenIssuer, TokenResponse},
    error::AppError,
    models::User,
    validation,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;

/// Login
///
/// Exchanges email + password for a signed session token. Lookup and
/// credential mismatches are both 400 (never 404), though the messages are
/// distinguishable; the token embeds the user's id and display name.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    credentials: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    validation::require_fields(&[
        (credentials.email.as_deref(), "O campo email é obrigatório!"),
        (
            credentials.password.as_deref(),
            "O campo senha é obrigatório!",
        ),
    ])?;
    let email = credentials.email.as_deref().unwrap_or_default().trim();
    let password = credentials.password.as_deref().unwrap_or_default();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, first_name, last_name, email, password FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        log::error!("login lookup failed: {}", e);
        AppError::Internal("Erro ao buscar usuário!".into())
    })?;

    let user = user.ok_or_else(|| AppError::BadRequest("Usuário não encontrado!".into()))?;

    if !verify_password(password, &user.password)? {
        return Err(AppError::BadRequest("Senha inválida!".into()));
    }

    let token = issuer.issue(user.id, &user.first_name, &user.last_name)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    // A lazy pool never connects unless a query runs, so the presence-check
    // rejections can be exercised without a database.
    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool")
    }

    #[actix_rt::test]
    async fn test_login_missing_fields_first_wins() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(TokenIssuer::new("segredo_de_teste")))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "O campo email é obrigatório!");

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "johndoe@example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "O campo senha é obrigatório!");
    }

    #[actix_rt::test]
    async fn test_login_empty_fields_count_as_missing() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(TokenIssuer::new("segredo_de_teste")))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "", "password": "Password1!" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "O campo email é obrigatório!");
    }
}
