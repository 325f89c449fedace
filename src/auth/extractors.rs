use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The acting identity resolved by the session middleware.
///
/// The middleware validates the token, re-checks that the subject still
/// exists, and inserts this value into request extensions. Handlers receive
/// it through `FromRequest`; if it is absent the request never passed the
/// session gate and is rejected as unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized("Token não informado!".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
