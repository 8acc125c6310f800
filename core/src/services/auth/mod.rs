//! Authentication flow module
//!
//! Owns the phone + one-time-PIN login state machine:
//! - PIN request and resend
//! - PIN verification and session establishment
//! - Registration (multipart payload, delegated to the gateway)
//! - Initial password setting
//! - Logout and forced logout on upstream credential rejection

mod service;

#[cfg(test)]
mod tests;

pub use service::AuthFlow;
