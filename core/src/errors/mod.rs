//! Error types for the authentication flow
//!
//! The taxonomy separates what can be detected locally (`ValidationError`),
//! what the backend explicitly declined (`RemoteRejection`), and what never
//! reached or never came back from the backend (`TransportError`). All three
//! are recovered into `Result` values returned to the caller; none of them
//! is ever raised as a panic.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to list-of-reasons map, as the backend returns for per-field
/// validation failures (e.g. on registration).
pub type FieldErrorMap = BTreeMap<String, Vec<String>>;

/// Errors detectable on the client before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Phone number must not be empty")]
    EmptyPhoneNumber,

    #[error("Please enter a valid phone number")]
    ImplausiblePhoneNumber,

    #[error("PIN must not be empty")]
    EmptyPin,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("No login code has been requested yet")]
    NoPinRequested,
}

/// Failures of the transport itself: the request never produced a usable
/// response. Carries no field attribution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),
}

/// A well-formed request that the backend explicitly declined.
///
/// The backend answers failures in three shapes: `{ "error": "..." }`, a
/// field-keyed map `{ field: [reasons] }`, or a plain string body. All of
/// them are normalized into this one type at the HTTP boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct RemoteRejection {
    /// Human-readable reason, suitable for direct display
    pub reason: String,
    /// Per-field reasons when the backend scoped the failure to fields
    pub field_errors: Option<FieldErrorMap>,
}

impl RemoteRejection {
    /// A rejection with a single global reason.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            field_errors: None,
        }
    }

    /// A rejection scoped to specific fields. The overall reason falls back
    /// to the first field's first message so there is always something to
    /// display.
    pub fn with_fields(field_errors: FieldErrorMap) -> Self {
        let reason = field_errors
            .iter()
            .find_map(|(_, reasons)| reasons.first().cloned())
            .unwrap_or_else(|| "Request rejected".to_string());
        Self {
            reason,
            field_errors: Some(field_errors),
        }
    }

    /// The reason to surface to the user, preferring a field-scoped one
    /// when both a global reason and field reasons are present.
    pub fn primary_reason(&self) -> &str {
        if let Some(fields) = &self.field_errors {
            if let Some(first) = fields.values().find_map(|reasons| reasons.first()) {
                return first;
            }
        }
        &self.reason
    }

    /// Reasons attributed to one specific field, if any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.field_errors
            .as_ref()
            .and_then(|fields| fields.get(name))
            .map(|reasons| reasons.as_slice())
    }
}

/// Umbrella error for the authentication flow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rejected(#[from] RemoteRejection),

    #[error("Session expired. Please log in again")]
    SessionExpired,

    /// The response was discarded: the flow was closed, or a later request
    /// already determined the state.
    #[error("Operation cancelled")]
    Cancelled,
}

impl AuthError {
    /// True if this error is a local validation failure (nothing was sent).
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation(_))
    }

    /// True if the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Transport(_))
    }
}

/// Registration failures are usually per-field validation problems, so the
/// register operation carries its own error type that preserves the field
/// map instead of flattening it into a single reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Registration rejected")]
    Fields(FieldErrorMap),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl RegistrationError {
    /// Reasons attributed to one specific form field, if any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        match self {
            RegistrationError::Fields(map) => map.get(name).map(|r| r.as_slice()),
            RegistrationError::Auth(AuthError::Rejected(rejection)) => rejection.field(name),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the flow.
pub type AuthResult<T> = Result<T, AuthError>;
