//! Remote authentication gateway seam
//!
//! The flow never talks HTTP directly; it goes through the [`AuthGateway`]
//! trait. The HTTP implementation lives in the infra crate, and a
//! scriptable mock is exported here for tests.

pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod mock;

pub use mock::{GatewayCall, MockAuthGateway};
pub use r#trait::{Attachment, AuthGateway, RegistrationRequest, SetPasswordRequest};
