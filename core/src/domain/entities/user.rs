//! User identity carried inside an authenticated session.

use serde::{Deserialize, Serialize};

/// Represents the type of account in the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// A homeowner looking for domestic services
    Homeowner,
    /// An individual maid offering cleaning services
    Maid,
    /// A registered cleaning company
    CleaningCompany,
    /// A home-care nurse
    HomeNurse,
    /// A platform administrator
    Admin,
}

/// Minimal identity of the authenticated user, as returned by the backend
/// alongside the bearer token.
///
/// Deserialized from the server's `user` object; fields the client does not
/// care about are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Server-side identifier for the account
    pub id: i64,

    /// Account username
    pub username: String,

    /// Phone number the account is registered under
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Optional contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Role of the account
    pub user_type: UserType,
}

impl UserIdentity {
    /// Checks if the user is a homeowner
    pub fn is_homeowner(&self) -> bool {
        self.user_type == UserType::Homeowner
    }

    /// Checks if the user is a maid
    pub fn is_maid(&self) -> bool {
        self.user_type == UserType::Maid
    }

    /// Checks if the user is a cleaning company
    pub fn is_cleaning_company(&self) -> bool {
        self.user_type == UserType::CleaningCompany
    }

    /// Checks if the user is a home nurse
    pub fn is_home_nurse(&self) -> bool {
        self.user_type == UserType::HomeNurse
    }

    /// Checks if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}
