//! # MaidMatch Infra
//!
//! HTTP transport layer for the MaidMatch client SDK. This crate owns
//! everything that touches the wire:
//!
//! - **ApiClient**: a `reqwest` wrapper that joins endpoint paths onto the
//!   configured base URL, bounds every call with timeouts, attaches the
//!   bearer token of the current session, and reports upstream credential
//!   rejections to the authentication flow.
//! - **HttpAuthGateway**: the [`mm_core::gateway::AuthGateway`]
//!   implementation against the MaidMatch accounts API.
//! - **Error-body normalization**: one adapter translating the backend's
//!   three failure shapes into [`mm_core::errors::RemoteRejection`].

pub mod http;

pub use http::client::ApiClient;
pub use http::gateway::HttpAuthGateway;
