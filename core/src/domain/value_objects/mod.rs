//! Value objects exchanged with the authentication gateway

pub mod auth_payload;

pub use auth_payload::AuthPayload;
