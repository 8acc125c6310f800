//! Unit tests for `AuthFlow`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::attempt::AuthPhase;
use crate::domain::entities::session::Session;
use crate::errors::{
    AuthError, RegistrationError, RemoteRejection, TransportError, ValidationError,
};
use crate::gateway::{GatewayCall, MockAuthGateway, RegistrationRequest};
use crate::services::auth::AuthFlow;
use crate::session::{MemorySessionStore, SessionRejectionObserver, SessionStore};

/// Store whose writes take a while, like a keychain or file store would.
struct SlowSaveStore {
    inner: MemorySessionStore,
    save_delay: Duration,
}

#[async_trait]
impl SessionStore for SlowSaveStore {
    async fn load(&self) -> Option<Session> {
        self.inner.load().await
    }

    async fn save(&self, session: Session) {
        tokio::time::sleep(self.save_delay).await;
        self.inner.save(session).await;
    }

    async fn clear(&self) {
        self.inner.clear().await
    }
}

fn flow() -> (
    Arc<AuthFlow<MockAuthGateway, MemorySessionStore>>,
    Arc<MockAuthGateway>,
    Arc<MemorySessionStore>,
) {
    let gateway = Arc::new(MockAuthGateway::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let flow = Arc::new(AuthFlow::new(gateway.clone(), sessions.clone()));
    (flow, gateway, sessions)
}

#[tokio::test]
async fn test_request_pin_success_enters_pin_sent() {
    let (flow, gateway, _) = flow();

    let result = flow.request_pin(" 077 234 5678 ").await;
    assert!(result.is_ok());
    assert_eq!(flow.phase(), AuthPhase::PinSent);

    // The gateway saw the normalized number.
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::SendPin {
            phone_number: "0772345678".to_string()
        }]
    );
}

#[tokio::test]
async fn test_request_pin_empty_phone_is_local_validation() {
    let (flow, gateway, _) = flow();

    let result = flow.request_pin("   ").await;
    assert_eq!(
        result,
        Err(AuthError::Validation(ValidationError::EmptyPhoneNumber))
    );
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    // Nothing was sent to the network.
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_request_pin_implausible_number_is_rejected_locally() {
    let (flow, gateway, _) = flow();

    let result = flow.request_pin("12345").await;
    assert_eq!(
        result,
        Err(AuthError::Validation(ValidationError::ImplausiblePhoneNumber))
    );
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_request_pin_failure_returns_to_awaiting_phone() {
    let (flow, gateway, sessions) = flow();
    gateway.queue_send_pin(Err(RemoteRejection::with_reason(
        "No account found for this phone number",
    )
    .into()));

    let result = flow.request_pin("0772345678").await;
    assert!(matches!(result, Err(AuthError::Rejected(_))));
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
}

#[tokio::test]
async fn test_resend_failure_keeps_pin_sent() {
    let (flow, gateway, _) = flow();

    flow.request_pin("0772345678").await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::PinSent);

    // The resend fails, but the first PIN may still be usable.
    gateway.queue_send_pin(Err(TransportError::Network("connection reset".into()).into()));
    let result = flow.request_pin("0772345678").await;
    assert!(matches!(result, Err(AuthError::Transport(_))));
    assert_eq!(flow.phase(), AuthPhase::PinSent);
}

#[tokio::test]
async fn test_verify_without_request_is_rejected_locally() {
    let (flow, gateway, _) = flow();

    let result = flow.verify_pin("0772345678", "123456").await;
    assert_eq!(
        result,
        Err(AuthError::Validation(ValidationError::NoPinRequested))
    );
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_verify_empty_pin_is_local_validation() {
    let (flow, _, _) = flow();
    flow.request_pin("0772345678").await.unwrap();

    let result = flow.verify_pin("0772345678", "   ").await;
    assert_eq!(result, Err(AuthError::Validation(ValidationError::EmptyPin)));
    assert_eq!(flow.phase(), AuthPhase::PinSent);
}

// Scenario A: happy path ends authenticated with a non-empty token.
#[tokio::test]
async fn test_request_then_verify_establishes_session() {
    let (flow, _, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    let session = flow.verify_pin("0772345678", "123456").await.unwrap();

    assert_eq!(flow.phase(), AuthPhase::Authenticated);
    assert!(!session.access_token.is_empty());
    assert_eq!(
        sessions.load().await.unwrap().access_token,
        session.access_token
    );
}

// Scenario B: wrong PIN surfaces the server reason and stays in PinSent.
#[tokio::test]
async fn test_wrong_pin_keeps_pin_sent_and_no_session() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    gateway.queue_verify(Err(RemoteRejection::with_reason("Invalid or expired code").into()));

    let err = flow.verify_pin("0772345678", "000000").await.unwrap_err();
    match err {
        AuthError::Rejected(rejection) => {
            assert_eq!(rejection.primary_reason(), "Invalid or expired code");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(flow.phase(), AuthPhase::PinSent);
    assert!(sessions.load().await.is_none());
}

// Property: no failing network call may ever produce a session.
#[tokio::test]
async fn test_verify_transport_failure_never_creates_session() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    gateway.queue_verify(Err(TransportError::Timeout.into()));

    let err = flow.verify_pin("0772345678", "123456").await.unwrap_err();
    assert_eq!(err, AuthError::Transport(TransportError::Timeout));
    assert_eq!(flow.phase(), AuthPhase::PinSent);
    assert!(sessions.load().await.is_none());
}

// Property: request_pin followed by logout leaves AwaitingPhone, no session.
#[tokio::test]
async fn test_request_pin_then_logout_resets() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.logout().await;

    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
    assert!(gateway.calls().contains(&GatewayCall::Logout));
}

#[tokio::test]
async fn test_logout_clears_session_even_if_remote_fails() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();
    assert!(sessions.load().await.is_some());

    gateway.queue_logout(Err(TransportError::Network("unreachable".into()).into()));
    flow.logout().await;

    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
}

// Property: registration ends in the same authenticated state as the
// request_pin + verify_pin path.
#[tokio::test]
async fn test_register_success_matches_pin_login_state() {
    let (flow, _, sessions) = flow();

    let request = RegistrationRequest::new()
        .field("username", "jane")
        .field("user_type", "maid")
        .field("phone_number", "0772345678")
        .field("password", "secret123")
        .field("password2", "secret123");

    let session = flow.register(request).await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::Authenticated);
    assert!(!session.access_token.is_empty());
    assert!(sessions.load().await.is_some());
}

#[tokio::test]
async fn test_register_field_errors_are_preserved() {
    let (flow, gateway, sessions) = flow();

    let mut map = crate::errors::FieldErrorMap::new();
    map.insert(
        "phone_number".to_string(),
        vec!["A user with this phone number already exists.".to_string()],
    );
    gateway.queue_register(Err(RegistrationError::Fields(map)));

    let err = flow
        .register(RegistrationRequest::new().field("phone_number", "0772345678"))
        .await
        .unwrap_err();

    assert_eq!(
        err.field("phone_number"),
        Some(&["A user with this phone number already exists.".to_string()][..])
    );
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
}

#[tokio::test]
async fn test_set_password_mismatch_is_checked_locally() {
    let (flow, gateway, _) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();

    let before = gateway.call_count();
    let result = flow.set_initial_password("abc123", "xyz999").await;
    assert_eq!(
        result,
        Err(AuthError::Validation(ValidationError::PasswordMismatch))
    );
    // The mismatch never reached the network.
    assert_eq!(gateway.call_count(), before);
}

#[tokio::test]
async fn test_set_password_requires_session() {
    let (flow, _, _) = flow();

    let result = flow.set_initial_password("abc123", "abc123").await;
    assert_eq!(result, Err(AuthError::SessionExpired));
}

// Scenario C: remote mismatch rejection attributed to new_password2,
// session untouched.
#[tokio::test]
async fn test_set_password_remote_rejection_is_field_scoped() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();
    let session_before = sessions.load().await.unwrap();

    let mut map = crate::errors::FieldErrorMap::new();
    map.insert(
        "new_password2".to_string(),
        vec!["Password fields didn't match.".to_string()],
    );
    gateway.queue_set_password(Err(RemoteRejection::with_fields(map).into()));

    let err = flow
        .set_initial_password("abc123", "abc123")
        .await
        .unwrap_err();
    match err {
        AuthError::Rejected(rejection) => {
            assert!(rejection.field("new_password2").is_some());
            assert_eq!(rejection.primary_reason(), "Password fields didn't match.");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(sessions.load().await.unwrap(), session_before);
    assert_eq!(flow.phase(), AuthPhase::Authenticated);
}

#[tokio::test]
async fn test_set_password_success_sends_empty_old_password() {
    let (flow, gateway, _) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();
    flow.set_initial_password("secret123", "secret123")
        .await
        .unwrap();

    let set_call = gateway
        .calls()
        .into_iter()
        .find_map(|call| match call {
            GatewayCall::SetPassword(request) => Some(request),
            _ => None,
        })
        .expect("set password call recorded");
    assert_eq!(set_call.old_password, "");
    assert_eq!(set_call.new_password, "secret123");
    assert_eq!(set_call.new_password2, "secret123");
}

// Scenario D: upstream credential rejection forces a silent logout.
#[tokio::test]
async fn test_session_rejection_forces_logout() {
    let (flow, _, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();
    assert!(sessions.load().await.is_some());

    flow.on_session_rejected().await;

    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
}

// Property: racing resend and verify; the later-issued resend resolves
// first, so the slower verify response is stale and must be discarded.
#[tokio::test(start_paused = true)]
async fn test_stale_verify_response_is_discarded() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();

    gateway.queue_verify_delayed(
        Ok(MockAuthGateway::payload_for("0772345678")),
        Duration::from_millis(50),
    );
    gateway.queue_send_pin_delayed(Ok(()), Duration::from_millis(10));

    let verify_flow = flow.clone();
    let verify = tokio::spawn(async move {
        verify_flow.verify_pin("0772345678", "123456").await
    });
    // Let the verify call reach the gateway before the resend is issued.
    tokio::task::yield_now().await;

    flow.request_pin("0772345678").await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::PinSent);

    let verify_result = verify.await.unwrap();
    assert_eq!(verify_result, Err(AuthError::Cancelled));
    assert_eq!(flow.phase(), AuthPhase::PinSent);
    assert!(sessions.load().await.is_none());
}

// Property: when the verify response resolves first, it wins; the later
// resend response must not demote the authenticated state.
#[tokio::test(start_paused = true)]
async fn test_late_resend_response_does_not_demote_authenticated() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();

    gateway.queue_verify_delayed(
        Ok(MockAuthGateway::payload_for("0772345678")),
        Duration::from_millis(10),
    );
    gateway.queue_send_pin_delayed(Ok(()), Duration::from_millis(50));

    let verify_flow = flow.clone();
    let verify = tokio::spawn(async move {
        verify_flow.verify_pin("0772345678", "123456").await
    });
    tokio::task::yield_now().await;

    let resend = flow.request_pin("0772345678").await;
    assert_eq!(resend, Err(AuthError::Cancelled));

    assert!(verify.await.unwrap().is_ok());
    assert_eq!(flow.phase(), AuthPhase::Authenticated);
    assert!(sessions.load().await.is_some());
}

// Property: teardown while a verify is in flight mutates nothing.
#[tokio::test(start_paused = true)]
async fn test_close_discards_in_flight_response() {
    let (flow, gateway, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();
    gateway.queue_verify_delayed(
        Ok(MockAuthGateway::payload_for("0772345678")),
        Duration::from_millis(50),
    );

    let verify_flow = flow.clone();
    let verify = tokio::spawn(async move {
        verify_flow.verify_pin("0772345678", "123456").await
    });
    tokio::task::yield_now().await;

    flow.close();

    let result = verify.await.unwrap();
    assert_eq!(result, Err(AuthError::Cancelled));
    assert!(sessions.load().await.is_none());
}

#[tokio::test]
async fn test_operations_after_close_are_cancelled() {
    let (flow, gateway, _) = flow();
    flow.close();

    assert_eq!(
        flow.request_pin("0772345678").await,
        Err(AuthError::Cancelled)
    );
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_in_flight_password_change() {
    let (flow, gateway, _) = flow();

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();

    gateway.queue_set_password_delayed(Ok(()), Duration::from_millis(50));
    let change_flow = flow.clone();
    let change = tokio::spawn(async move {
        change_flow
            .set_initial_password("secret123", "secret123")
            .await
    });
    tokio::task::yield_now().await;

    flow.close();

    assert_eq!(change.await.unwrap(), Err(AuthError::Cancelled));
}

// Property: a forced logout that lands while the session write is still in
// flight stays a logout; the finishing write must not resurrect the session.
#[tokio::test(start_paused = true)]
async fn test_forced_logout_during_session_save_is_not_overwritten() {
    let gateway = Arc::new(MockAuthGateway::new());
    let sessions = Arc::new(SlowSaveStore {
        inner: MemorySessionStore::new(),
        save_delay: Duration::from_millis(30),
    });
    let flow = Arc::new(AuthFlow::new(gateway.clone(), sessions.clone()));

    flow.request_pin("0772345678").await.unwrap();
    gateway.queue_verify_delayed(
        Ok(MockAuthGateway::payload_for("0772345678")),
        Duration::from_millis(10),
    );

    let verify_flow = flow.clone();
    let verify = tokio::spawn(async move {
        verify_flow.verify_pin("0772345678", "123456").await
    });
    tokio::task::yield_now().await;

    // The verify response resolves at 10ms and starts its slow save; the
    // upstream rejection arrives at 15ms, before the save lands.
    tokio::time::sleep(Duration::from_millis(15)).await;
    flow.on_session_rejected().await;

    let verify_result = verify.await.unwrap();
    assert_eq!(verify_result, Err(AuthError::Cancelled));
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());
}

// The flow futures are spawnable; nothing held across an await pins them
// to one thread.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_flow_operations_can_be_spawned() {
    let (flow, _, sessions) = flow();

    flow.request_pin("0772345678").await.unwrap();

    let verify_flow = flow.clone();
    let verify = tokio::spawn(async move {
        verify_flow.verify_pin("0772345678", "123456").await
    });

    assert!(verify.await.unwrap().is_ok());
    assert_eq!(flow.phase(), AuthPhase::Authenticated);
    assert!(sessions.load().await.is_some());
}
