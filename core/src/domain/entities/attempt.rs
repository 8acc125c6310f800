//! Ephemeral record of an in-progress login challenge/response exchange.

use serde::{Deserialize, Serialize};

/// Phase of the authentication state machine.
///
/// Legal transitions:
///
/// ```text
/// AwaitingPhone --request_pin ok--> PinSent
/// PinSent --request_pin (resend)--> PinSent
/// PinSent --verify_pin--> Verifying --ok--> Authenticated
///                                   --err--> PinSent
/// Authenticated --logout--> AwaitingPhone
/// any --session rejected elsewhere--> AwaitingPhone
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPhase {
    /// Waiting for the user to submit a phone number
    AwaitingPhone,
    /// A PIN was requested for the recorded phone number
    PinSent,
    /// A PIN verification request is in flight
    Verifying,
    /// A session has been established
    Authenticated,
    /// The attempt failed terminally. The flow itself keeps failures
    /// re-enterable (`AwaitingPhone`/`PinSent`); this phase is reserved for
    /// callers that abandon an attempt.
    Failed,
}

/// Client-side record of one login attempt. Never persisted: it lives only
/// as long as the flow that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAttempt {
    /// Normalized phone number the attempt is for, once known
    pub phone_number: Option<String>,
    /// PIN as last submitted, cleared on success
    pub pin: Option<String>,
    /// Current phase of the state machine
    pub phase: AuthPhase,
}

impl AuthAttempt {
    /// A fresh attempt waiting for a phone number.
    pub fn new() -> Self {
        Self {
            phone_number: None,
            pin: None,
            phase: AuthPhase::AwaitingPhone,
        }
    }

    /// Reset back to the initial state, discarding any recorded input.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True once a PIN has been requested and not yet consumed.
    pub fn has_pin_outstanding(&self) -> bool {
        matches!(self.phase, AuthPhase::PinSent | AuthPhase::Verifying)
    }
}

impl Default for AuthAttempt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_attempt_is_awaiting_phone() {
        let attempt = AuthAttempt::new();
        assert_eq!(attempt.phase, AuthPhase::AwaitingPhone);
        assert!(attempt.phone_number.is_none());
        assert!(attempt.pin.is_none());
        assert!(!attempt.has_pin_outstanding());
    }

    #[test]
    fn test_reset_discards_input() {
        let mut attempt = AuthAttempt {
            phone_number: Some("0772345678".to_string()),
            pin: Some("123456".to_string()),
            phase: AuthPhase::PinSent,
        };
        attempt.reset();
        assert_eq!(attempt, AuthAttempt::new());
    }

    #[test]
    fn test_pin_outstanding_phases() {
        let mut attempt = AuthAttempt::new();
        attempt.phase = AuthPhase::PinSent;
        assert!(attempt.has_pin_outstanding());
        attempt.phase = AuthPhase::Verifying;
        assert!(attempt.has_pin_outstanding());
        attempt.phase = AuthPhase::Authenticated;
        assert!(!attempt.has_pin_outstanding());
    }
}
