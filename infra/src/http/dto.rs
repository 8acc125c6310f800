//! Wire DTOs for the accounts API.

use serde::{Deserialize, Serialize};

use mm_core::domain::entities::user::UserIdentity;
use mm_core::domain::value_objects::AuthPayload;

/// Request body for `POST /accounts/login/send-pin/`.
#[derive(Debug, Serialize)]
pub struct SendPinRequest<'a> {
    pub phone_number: &'a str,
}

/// Request body for `POST /accounts/login/verify-pin/`.
#[derive(Debug, Serialize)]
pub struct VerifyPinRequest<'a> {
    pub phone_number: &'a str,
    pub pin: &'a str,
}

/// Request body for `POST /accounts/users/set_initial_password/`.
///
/// `old_password` is always the empty string: the backend serializer
/// requires the field but ignores it for the initial-password flow.
#[derive(Debug, Serialize)]
pub struct SetPasswordBody<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
    pub new_password2: &'a str,
}

/// Success body of verify-pin and register: the bearer token plus the
/// authenticated user. Extra fields (e.g. a `message`) are ignored.
#[derive(Debug, Deserialize)]
pub struct AuthResponseDto {
    pub access: String,
    pub user: UserIdentity,
}

impl From<AuthResponseDto> for AuthPayload {
    fn from(dto: AuthResponseDto) -> Self {
        AuthPayload::new(dto.access, dto.user)
    }
}
