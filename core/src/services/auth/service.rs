//! Authentication flow implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use mm_shared::utils::phone::{
    is_plausible_phone_number, mask_phone_number, normalize_phone_number,
};

use crate::domain::entities::attempt::{AuthAttempt, AuthPhase};
use crate::domain::entities::session::Session;
use crate::errors::{AuthError, AuthResult, RegistrationError, ValidationError};
use crate::gateway::{AuthGateway, RegistrationRequest, SetPasswordRequest};
use crate::session::{SessionRejectionObserver, SessionStore};

/// Mutable flow state, guarded by one mutex.
///
/// `applied_ticket` is the ticket of the most recent response that was
/// allowed to mutate state. A response is discarded when a response from a
/// later-issued request has already been applied, so two racing requests
/// cannot silently overwrite each other's outcome: the last one to resolve
/// (that is not already superseded) determines the final state.
struct FlowState {
    attempt: AuthAttempt,
    applied_ticket: u64,
}

/// The authentication flow controller.
///
/// One instance owns one [`AuthAttempt`] and the write side of the session
/// store. UI forms call the operations; the flow talks to the remote
/// service through the injected [`AuthGateway`], interprets the outcome,
/// and advances the state machine.
///
/// The flow is safe to share behind an `Arc`. It does not serialize
/// concurrent operations; duplicate-submission prevention belongs to the
/// caller, but racing requests always leave the machine in a well-defined
/// state (see [`FlowState`]).
pub struct AuthFlow<G, S>
where
    G: AuthGateway,
    S: SessionStore,
{
    /// Remote authentication service
    gateway: Arc<G>,
    /// Process-wide session storage
    sessions: Arc<S>,
    /// State machine plus response-ordering bookkeeping
    state: Mutex<FlowState>,
    /// Monotonically increasing ticket source for issued requests
    tickets: AtomicU64,
    /// Set once the owning surface has been torn down
    closed: AtomicBool,
}

impl<G, S> AuthFlow<G, S>
where
    G: AuthGateway,
    S: SessionStore,
{
    /// Create a new flow in the `AwaitingPhone` state.
    pub fn new(gateway: Arc<G>, sessions: Arc<S>) -> Self {
        Self {
            gateway,
            sessions,
            state: Mutex::new(FlowState {
                attempt: AuthAttempt::new(),
                applied_ticket: 0,
            }),
            tickets: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> AuthPhase {
        self.state_guard().attempt.phase
    }

    /// The established session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.sessions.load().await
    }

    /// Tear the flow down. Responses that resolve afterwards are discarded
    /// without mutating state; their callers receive [`AuthError::Cancelled`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Ask the service to deliver a one-time PIN to `phone_number`.
    ///
    /// The number is normalized (trimmed, separators stripped), must be
    /// non-empty afterwards and must pass a loose plausibility check; the
    /// real format rules are the backend's job. On success the machine
    /// enters `PinSent`. On failure the machine
    /// stays in `AwaitingPhone`, except for a failed resend while a PIN is
    /// already outstanding, which keeps `PinSent` because the previously
    /// delivered PIN may still be valid.
    ///
    /// Calling this again while in `PinSent` is the resend path; no client
    /// side limit is applied.
    pub async fn request_pin(&self, phone_number: &str) -> AuthResult<()> {
        let phone = normalize_phone_number(phone_number);
        if phone.is_empty() {
            return Err(ValidationError::EmptyPhoneNumber.into());
        }
        if !is_plausible_phone_number(&phone) {
            return Err(ValidationError::ImplausiblePhoneNumber.into());
        }

        let ticket = self.issue_ticket()?;
        debug!(phone = %mask_phone_number(&phone), "requesting login PIN");

        let outcome = self.gateway.send_login_pin(&phone).await;

        let mut state = match self.admit(ticket) {
            Some(state) => state,
            None => return Err(AuthError::Cancelled),
        };
        // A completed attempt is destroyed on success; a late resend
        // response must not demote `Authenticated`.
        if state.attempt.phase == AuthPhase::Authenticated {
            return Err(AuthError::Cancelled);
        }

        match outcome {
            Ok(()) => {
                state.attempt.phone_number = Some(phone.clone());
                state.attempt.pin = None;
                state.attempt.phase = AuthPhase::PinSent;
                Self::commit(&mut state, ticket);
                info!(phone = %mask_phone_number(&phone), "login PIN sent");
                Ok(())
            }
            Err(err) => {
                if !state.attempt.has_pin_outstanding() {
                    state.attempt.reset();
                }
                Self::commit(&mut state, ticket);
                warn!(
                    phone = %mask_phone_number(&phone),
                    error = %err,
                    "failed to send login PIN"
                );
                Err(err)
            }
        }
    }

    /// Submit the PIN received out-of-band for verification.
    ///
    /// Requires an outstanding PIN (`PinSent`). While the request is in
    /// flight the phase is `Verifying`; it never stays there: success
    /// stores the new [`Session`] and ends in `Authenticated`, failure
    /// returns to `PinSent` so the user can re-enter or resend.
    pub async fn verify_pin(&self, phone_number: &str, pin: &str) -> AuthResult<Session> {
        let phone = normalize_phone_number(phone_number);
        if phone.is_empty() {
            return Err(ValidationError::EmptyPhoneNumber.into());
        }
        let pin = pin.trim().to_string();
        if pin.is_empty() {
            return Err(ValidationError::EmptyPin.into());
        }

        let ticket = self.issue_ticket()?;
        {
            let mut state = self.state_guard();
            if !state.attempt.has_pin_outstanding() {
                return Err(ValidationError::NoPinRequested.into());
            }
            state.attempt.phase = AuthPhase::Verifying;
            state.attempt.pin = Some(pin.clone());
        }

        debug!(phone = %mask_phone_number(&phone), "verifying login PIN");

        let outcome = self.gateway.verify_login_pin(&phone, &pin).await;

        match outcome {
            Ok(payload) => {
                let session = Session::from_payload(payload);
                {
                    let mut state = match self.admit(ticket) {
                        Some(state) => state,
                        None => return Err(AuthError::Cancelled),
                    };
                    state.attempt.phone_number = Some(phone.clone());
                    state.attempt.pin = None;
                    state.attempt.phase = AuthPhase::Authenticated;
                    Self::commit(&mut state, ticket);
                }

                self.sessions.save(session.clone()).await;
                if self.superseded(ticket) {
                    // A logout or forced logout landed while the write was
                    // in flight; its cleared store must stay cleared.
                    self.sessions.clear().await;
                    return Err(AuthError::Cancelled);
                }
                info!(phone = %mask_phone_number(&phone), "authenticated");
                Ok(session)
            }
            Err(err) => {
                {
                    let mut state = match self.admit(ticket) {
                        Some(state) => state,
                        None => return Err(AuthError::Cancelled),
                    };
                    if state.attempt.phase == AuthPhase::Verifying {
                        state.attempt.phase = AuthPhase::PinSent;
                        Self::commit(&mut state, ticket);
                    }
                }
                warn!(
                    phone = %mask_phone_number(&phone),
                    error = %err,
                    "PIN verification failed"
                );
                Err(err)
            }
        }
    }

    /// Create a new account and establish a session for it.
    ///
    /// The payload is opaque to the flow: the registration form decides
    /// which fields each role requires. On success this behaves exactly
    /// like a successful [`verify_pin`](Self::verify_pin). Failures keep
    /// the backend's field attribution so the form can place each message
    /// next to the input that caused it.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<Session, RegistrationError> {
        let ticket = self
            .issue_ticket()
            .map_err(RegistrationError::Auth)?;
        debug!(fields = request.fields.len(), "submitting registration");

        let outcome = self.gateway.register(request).await;

        match outcome {
            Ok(payload) => {
                let session = Session::from_payload(payload);
                {
                    let mut state = match self.admit(ticket) {
                        Some(state) => state,
                        None => return Err(RegistrationError::Auth(AuthError::Cancelled)),
                    };
                    state.attempt.phone_number = session.user.phone_number.clone();
                    state.attempt.pin = None;
                    state.attempt.phase = AuthPhase::Authenticated;
                    Self::commit(&mut state, ticket);
                }

                self.sessions.save(session.clone()).await;
                if self.superseded(ticket) {
                    self.sessions.clear().await;
                    return Err(RegistrationError::Auth(AuthError::Cancelled));
                }
                info!(user_id = session.user.id, "registered and authenticated");
                Ok(session)
            }
            Err(err) => {
                // Registration failures leave whatever attempt was in
                // progress untouched.
                if self.admit(ticket).is_none() {
                    return Err(RegistrationError::Auth(AuthError::Cancelled));
                }
                warn!(error = %err, "registration rejected");
                Err(err)
            }
        }
    }

    /// Set the account's permanent password after a PIN-based login.
    ///
    /// Requires an established session. The confirmation is pre-checked
    /// locally for responsiveness; the backend remains the authority and
    /// its reasons are surfaced verbatim, preferring a field-scoped reason
    /// when the response carries one.
    pub async fn set_initial_password(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> AuthResult<()> {
        if new_password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        let ticket = self.issue_ticket()?;
        if self.sessions.load().await.is_none() {
            return Err(AuthError::SessionExpired);
        }

        let request = SetPasswordRequest::initial(new_password, confirm_password);
        let outcome = self.gateway.set_initial_password(request).await;

        match self.admit(ticket) {
            Some(mut state) => Self::commit(&mut state, ticket),
            None => return Err(AuthError::Cancelled),
        }

        match outcome {
            Ok(()) => {
                info!("initial password set");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to set initial password");
                Err(err)
            }
        }
    }

    /// Log out. Attempts a best-effort remote invalidation, then always
    /// destroys the local session and returns the machine to
    /// `AwaitingPhone`. Never fails.
    pub async fn logout(&self) {
        let ticket = self.next_ticket();

        // Remote invalidation first: it needs the bearer token that is
        // about to be destroyed.
        if let Err(err) = self.gateway.logout().await {
            warn!(error = %err, "remote logout failed; clearing local session anyway");
        }

        {
            let mut state = self.state_guard();
            state.attempt.reset();
            Self::commit(&mut state, ticket);
        }
        self.sessions.clear().await;
        info!("logged out");
    }

    fn state_guard(&self) -> MutexGuard<'_, FlowState> {
        // The mutex is never held across an await point; recover from
        // poisoning instead of propagating a panic from another task.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take a ticket for a new request, refusing if the flow is closed.
    fn issue_ticket(&self) -> AuthResult<u64> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AuthError::Cancelled);
        }
        Ok(self.next_ticket())
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Admit a resolved response for state application. Returns `None` if
    /// the flow is closed or a later-issued request already applied.
    fn admit(&self, ticket: u64) -> Option<MutexGuard<'_, FlowState>> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        let state = self.state_guard();
        if ticket < state.applied_ticket {
            return None;
        }
        Some(state)
    }

    fn commit(state: &mut FlowState, ticket: u64) {
        if ticket > state.applied_ticket {
            state.applied_ticket = ticket;
        }
    }

    /// True if, after this response was committed, the flow was closed or
    /// a later-issued response was applied. Checked again after the session
    /// write, which happens outside the state lock.
    fn superseded(&self, ticket: u64) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return true;
        }
        self.state_guard().applied_ticket > ticket
    }
}

#[async_trait]
impl<G, S> SessionRejectionObserver for AuthFlow<G, S>
where
    G: AuthGateway,
    S: SessionStore,
{
    /// Forced logout: some authenticated call elsewhere was rejected for
    /// credential reasons. Silent; the caller that hit the rejection owns
    /// any user-facing message.
    async fn on_session_rejected(&self) {
        let ticket = self.next_ticket();
        {
            let mut state = self.state_guard();
            state.attempt.reset();
            Self::commit(&mut state, ticket);
        }
        self.sessions.clear().await;
        info!("session rejected upstream; local session cleared");
    }
}
