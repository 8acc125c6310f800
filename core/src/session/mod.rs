//! Session storage and invalidation notification
//!
//! The stored session is process-wide: anything issuing authenticated
//! requests may read it, but only the authentication flow writes it. When
//! some other component's authenticated call is rejected for credential
//! reasons, it notifies the flow through [`SessionRejectionObserver`]
//! rather than touching the store itself, so the forced-logout transition
//! is applied in exactly one place.

pub mod store;

use async_trait::async_trait;

pub use store::{MemorySessionStore, SessionStore};

/// Receiver for "an authenticated call was rejected" notifications.
#[async_trait]
pub trait SessionRejectionObserver: Send + Sync {
    /// Called when any authenticated request elsewhere in the client was
    /// rejected for credential reasons.
    async fn on_session_rejected(&self);
}
