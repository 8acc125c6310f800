//! Client-side services

pub mod auth;

pub use auth::AuthFlow;
