use crate::domain::error::AppError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity asserted by the fronting identity layer.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        ready(match id {
            Some(id) => Ok(AuthUser { id: id.to_string() }),
            None => Err(AppError::Unauthorized("Unauthorized".to_string())),
        })
    }
}
