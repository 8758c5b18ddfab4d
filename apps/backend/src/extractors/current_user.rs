use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::game::events::UserId;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
///
/// Authentication itself is an external collaborator: the auth layer in
/// front of this service validates the session and forwards the user id in
/// `x-user-id`. Requests without a usable id are rejected as unauthorized.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        ready(match parsed {
            Some(id) => Ok(CurrentUser { id: UserId(id) }),
            None => Err(AppError::unauthorized()),
        })
    }
}
