//! HTTP client, DTOs, and the auth gateway implementation

pub mod client;
pub mod dto;
pub mod error_body;
pub mod gateway;
