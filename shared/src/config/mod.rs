//! Configuration module for the MaidMatch client

pub mod client;

pub use client::ApiClientConfig;
