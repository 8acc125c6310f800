//! # MaidMatch Core
//!
//! Core domain and authentication logic for the MaidMatch client SDK.
//! This crate contains the domain entities, the authentication state
//! machine, the remote-gateway seam, the session store, and the error
//! types shared by the whole client.

pub mod domain;
pub mod errors;
pub mod gateway;
pub mod services;
pub mod session;

// Re-export commonly used types for convenience
pub use domain::entities::{AuthAttempt, AuthPhase, Session, UserIdentity, UserType};
pub use domain::value_objects::AuthPayload;
pub use errors::{
    AuthError, AuthResult, FieldErrorMap, RegistrationError, RemoteRejection, TransportError,
    ValidationError,
};
pub use gateway::{
    Attachment, AuthGateway, GatewayCall, MockAuthGateway, RegistrationRequest,
    SetPasswordRequest,
};
pub use services::AuthFlow;
pub use session::{MemorySessionStore, SessionRejectionObserver, SessionStore};
