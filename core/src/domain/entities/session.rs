//! Session entity: the durable artifact of a successful authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserIdentity;
use crate::domain::value_objects::AuthPayload;

/// An established session: an opaque bearer credential plus the minimal
/// identity of the user it belongs to.
///
/// Only the authentication flow creates, replaces or destroys sessions; the
/// rest of the client reads the token to authenticate its own requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token attached to authenticated requests
    pub access_token: String,

    /// Identity of the authenticated user
    pub user: UserIdentity,

    /// When this session was established on the client
    pub established_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a successful authentication payload.
    pub fn from_payload(payload: AuthPayload) -> Self {
        Self {
            access_token: payload.access_token,
            user: payload.user,
            established_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::UserType;

    fn identity() -> UserIdentity {
        UserIdentity {
            id: 7,
            username: "owner".to_string(),
            phone_number: Some("0772345678".to_string()),
            email: None,
            user_type: UserType::Homeowner,
        }
    }

    #[test]
    fn test_session_from_payload() {
        let session = Session::from_payload(AuthPayload {
            access_token: "tok-abc".to_string(),
            user: identity(),
        });
        assert_eq!(session.access_token, "tok-abc");
        assert!(session.user.is_homeowner());
    }
}
