//! Utility functions shared across the client SDK

pub mod phone;
