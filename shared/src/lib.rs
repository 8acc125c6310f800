//! # MaidMatch Shared
//!
//! Shared configuration and utility code for the MaidMatch client SDK.
//! This crate carries the pieces that both the domain layer and the HTTP
//! layer need: API client configuration and phone number utilities.

pub mod config;
pub mod utils;
