//! Domain entities for the authentication flow

pub mod attempt;
pub mod session;
pub mod user;

pub use attempt::{AuthAttempt, AuthPhase};
pub use session::Session;
pub use user::{UserIdentity, UserType};
