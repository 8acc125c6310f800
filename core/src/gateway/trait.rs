//! Gateway trait describing the remote authentication service surface.

use async_trait::async_trait;

use crate::domain::value_objects::AuthPayload;
use crate::errors::{AuthError, RegistrationError};

/// Opaque registration payload assembled by the registration form.
///
/// The flow does not interpret the fields; which fields a role requires is
/// the form's business. Attachments (e.g. a profile photo) are carried as
/// raw bytes and encoded as multipart by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Plain form fields in submission order
    pub fields: Vec<(String, String)>,
    /// Binary parts such as a profile photo
    pub attachments: Vec<Attachment>,
}

impl RegistrationRequest {
    /// Start an empty registration payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain form field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a binary attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Look up a field value by name (first match).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A binary part of the registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field name, e.g. `profile_photo`
    pub field_name: String,
    /// Original file name
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Request body for setting the initial account password.
///
/// `old_password` is always empty for this flow; the backend's serializer
/// requires the field but ignores its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

impl SetPasswordRequest {
    /// Build the request for the initial-password flow.
    pub fn initial(new_password: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            old_password: String::new(),
            new_password: new_password.into(),
            new_password2: confirm.into(),
        }
    }
}

/// The remote authentication service, as seen by the client.
///
/// Implementations must be cancel-safe: the flow may drop a call's future
/// or discard its result if a later operation supersedes it.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Ask the service to deliver a one-time PIN to `phone_number` via its
    /// out-of-band channel. The PIN itself is never returned.
    async fn send_login_pin(&self, phone_number: &str) -> Result<(), AuthError>;

    /// Submit the PIN for verification. On success the service returns the
    /// bearer token and user identity.
    async fn verify_login_pin(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<AuthPayload, AuthError>;

    /// Create a new account. On success the service returns a payload
    /// equivalent to a successful PIN verification.
    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<AuthPayload, RegistrationError>;

    /// Set the account's permanent password. Requires an authenticated
    /// transport (the bearer token of the current session).
    async fn set_initial_password(&self, request: SetPasswordRequest) -> Result<(), AuthError>;

    /// Invalidate the session server-side. Best effort; callers ignore
    /// failures.
    async fn logout(&self) -> Result<(), AuthError>;
}
