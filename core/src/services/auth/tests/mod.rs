//! Unit tests for the authentication flow

mod service_tests;
