//! Scriptable in-memory gateway for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::user::{UserIdentity, UserType};
use crate::domain::value_objects::AuthPayload;
use crate::errors::{AuthError, RegistrationError};

use super::r#trait::{AuthGateway, RegistrationRequest, SetPasswordRequest};

/// A recorded gateway invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SendPin { phone_number: String },
    VerifyPin { phone_number: String, pin: String },
    Register(RegistrationRequest),
    SetPassword(SetPasswordRequest),
    Logout,
}

type Scripted<T> = Mutex<VecDeque<(Option<Duration>, T)>>;

/// In-memory [`AuthGateway`] with scriptable per-call outcomes.
///
/// Outcomes are consumed in FIFO order; when no outcome is queued the call
/// succeeds with a canned payload. Each queued outcome may carry a delay,
/// which lets tests interleave two in-flight calls deterministically under
/// a paused tokio clock.
pub struct MockAuthGateway {
    send_pin_results: Scripted<Result<(), AuthError>>,
    verify_results: Scripted<Result<AuthPayload, AuthError>>,
    register_results: Scripted<Result<AuthPayload, RegistrationError>>,
    set_password_results: Scripted<Result<(), AuthError>>,
    logout_results: Scripted<Result<(), AuthError>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockAuthGateway {
    pub fn new() -> Self {
        Self {
            send_pin_results: Mutex::new(VecDeque::new()),
            verify_results: Mutex::new(VecDeque::new()),
            register_results: Mutex::new(VecDeque::new()),
            set_password_results: Mutex::new(VecDeque::new()),
            logout_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Canned successful payload for `phone_number`.
    pub fn payload_for(phone_number: &str) -> AuthPayload {
        AuthPayload::new(
            format!("token-{phone_number}"),
            UserIdentity {
                id: 1,
                username: phone_number.to_string(),
                phone_number: Some(phone_number.to_string()),
                email: None,
                user_type: UserType::Homeowner,
            },
        )
    }

    pub fn queue_send_pin(&self, result: Result<(), AuthError>) {
        self.send_pin_results.lock().unwrap().push_back((None, result));
    }

    pub fn queue_send_pin_delayed(&self, result: Result<(), AuthError>, delay: Duration) {
        self.send_pin_results
            .lock()
            .unwrap()
            .push_back((Some(delay), result));
    }

    pub fn queue_verify(&self, result: Result<AuthPayload, AuthError>) {
        self.verify_results.lock().unwrap().push_back((None, result));
    }

    pub fn queue_verify_delayed(&self, result: Result<AuthPayload, AuthError>, delay: Duration) {
        self.verify_results
            .lock()
            .unwrap()
            .push_back((Some(delay), result));
    }

    pub fn queue_register(&self, result: Result<AuthPayload, RegistrationError>) {
        self.register_results.lock().unwrap().push_back((None, result));
    }

    pub fn queue_set_password(&self, result: Result<(), AuthError>) {
        self.set_password_results
            .lock()
            .unwrap()
            .push_back((None, result));
    }

    pub fn queue_set_password_delayed(&self, result: Result<(), AuthError>, delay: Duration) {
        self.set_password_results
            .lock()
            .unwrap()
            .push_back((Some(delay), result));
    }

    pub fn queue_logout(&self, result: Result<(), AuthError>) {
        self.logout_results.lock().unwrap().push_back((None, result));
    }

    /// All invocations recorded so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of invocations of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn resolve<T>(scripted: &Scripted<T>, fallback: T) -> T {
        let next = scripted.lock().unwrap().pop_front();
        match next {
            Some((Some(delay), outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            Some((None, outcome)) => outcome,
            None => fallback,
        }
    }
}

impl Default for MockAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn send_login_pin(&self, phone_number: &str) -> Result<(), AuthError> {
        self.record(GatewayCall::SendPin {
            phone_number: phone_number.to_string(),
        });
        Self::resolve(&self.send_pin_results, Ok(())).await
    }

    async fn verify_login_pin(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<AuthPayload, AuthError> {
        self.record(GatewayCall::VerifyPin {
            phone_number: phone_number.to_string(),
            pin: pin.to_string(),
        });
        Self::resolve(&self.verify_results, Ok(Self::payload_for(phone_number))).await
    }

    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<AuthPayload, RegistrationError> {
        let phone = request.get("phone_number").unwrap_or("unknown").to_string();
        self.record(GatewayCall::Register(request));
        Self::resolve(&self.register_results, Ok(Self::payload_for(&phone))).await
    }

    async fn set_initial_password(&self, request: SetPasswordRequest) -> Result<(), AuthError> {
        self.record(GatewayCall::SetPassword(request));
        Self::resolve(&self.set_password_results, Ok(())).await
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.record(GatewayCall::Logout);
        Self::resolve(&self.logout_results, Ok(())).await
    }
}
