//! Authentication payload value object.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::UserIdentity;

/// What the backend hands back on successful PIN verification or
/// registration: the bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Opaque bearer token for subsequent authenticated requests
    pub access_token: String,

    /// Identity of the authenticated user
    pub user: UserIdentity,
}

impl AuthPayload {
    /// Creates a new authentication payload
    pub fn new(access_token: String, user: UserIdentity) -> Self {
        Self { access_token, user }
    }
}
