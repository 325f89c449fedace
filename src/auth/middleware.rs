use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenIssuer;
use crate::config::Config;
use crate::error::AppError;

/// Session gate applied to the `/api` scope.
///
/// Every request repeats the full check sequence independently; no state is
/// retained between requests. A token is accepted only if its signature and
/// expiry hold *and* its subject still resolves to an existing user record
/// (one documented extra store round trip per request).
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc so the response future can own the inner service across the
    // asynchronous liveness lookup.
    service: Rc<S>,
}

/// Login and registration are the only unauthenticated endpoints under `/api`.
fn is_public(req: &ServiceRequest) -> bool {
    req.path().starts_with("/api/auth/login")
        || (req.method() == Method::POST && req.path() == "/api/v1/users")
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let bypass = req
                .app_data::<web::Data<Config>>()
                .map_or(false, |config| config.auth_bypass);
            if bypass || is_public(&req) {
                return service.call(req).await;
            }

            let header = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let header = match header {
                Some(header) => header,
                None => {
                    return Err(AppError::Unauthorized("Token não informado!".into()).into());
                }
            };

            let parts: Vec<&str> = header.split(' ').collect();
            if parts.len() != 2 {
                return Err(AppError::BadRequest(
                    "Token deve ser composto por duas partes: 'Bearer' e o valor do token.".into(),
                )
                .into());
            }

            let (scheme, token) = (parts[0], parts[1]);
            if !scheme.eq_ignore_ascii_case("Bearer") {
                return Err(AppError::BadRequest(
                    "Formato do token inválido! O formato correto é: Bearer [token].".into(),
                )
                .into());
            }

            let issuer = req.app_data::<web::Data<TokenIssuer>>().ok_or_else(|| {
                log::error!("TokenIssuer not registered as app data");
                Error::from(AppError::Internal("Erro interno do servidor!".into()))
            })?;
            let claims = issuer.verify(token)?;

            // Liveness check: a token is valid only if its subject still exists.
            let pool = req.app_data::<web::Data<PgPool>>().ok_or_else(|| {
                log::error!("PgPool not registered as app data");
                Error::from(AppError::Internal("Erro interno do servidor!".into()))
            })?;
            let subject = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
                .bind(claims.sub)
                .fetch_optional(pool.get_ref())
                .await
                .map_err(|e| {
                    log::error!("session subject lookup failed: {}", e);
                    Error::from(AppError::Internal("Erro interno do servidor!".into()))
                })?;
            if subject.is_none() {
                return Err(
                    AppError::Unauthorized("Token inválido! Usuário não encontrado.".into()).into(),
                );
            }

            req.extensions_mut()
                .insert(AuthenticatedUser { id: claims.sub });
            service.call(req).await
        })
    }
}
