//! End-to-end exercises of the authentication flow through the public API.

use std::sync::Arc;

use mm_core::{
    AuthError, AuthFlow, AuthPhase, MemorySessionStore, MockAuthGateway, RegistrationRequest,
    SessionRejectionObserver, SessionStore,
};

#[tokio::test]
async fn test_full_first_login_journey() {
    let gateway = Arc::new(MockAuthGateway::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let flow = AuthFlow::new(gateway.clone(), sessions.clone());

    // Phone submission, PIN delivery, verification.
    flow.request_pin("0772345678").await.unwrap();
    let session = flow.verify_pin("0772345678", "123456").await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::Authenticated);

    // First login: set the permanent password.
    flow.set_initial_password("hunter2hunter2", "hunter2hunter2")
        .await
        .unwrap();

    // The session is readable by the rest of the client.
    assert_eq!(
        sessions.load().await.unwrap().access_token,
        session.access_token
    );

    // Explicit logout returns to the initial state.
    flow.logout().await;
    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());

    // The machine is re-enterable without any reset ceremony.
    flow.request_pin("0772345678").await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::PinSent);
}

#[tokio::test]
async fn test_registration_journey() {
    let gateway = Arc::new(MockAuthGateway::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let flow = AuthFlow::new(gateway, sessions.clone());

    let request = RegistrationRequest::new()
        .field("username", "jane")
        .field("email", "jane@example.com")
        .field("user_type", "homeowner")
        .field("phone_number", "0772345678")
        .field("address", "12 Hill Road")
        .field("password", "secret123")
        .field("password2", "secret123");

    let session = flow.register(request).await.unwrap();
    assert_eq!(flow.phase(), AuthPhase::Authenticated);
    assert_eq!(sessions.load().await.unwrap(), session);
}

#[tokio::test]
async fn test_upstream_rejection_is_a_silent_forced_logout() {
    let gateway = Arc::new(MockAuthGateway::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let flow = AuthFlow::new(gateway, sessions.clone());

    flow.request_pin("0772345678").await.unwrap();
    flow.verify_pin("0772345678", "123456").await.unwrap();

    // Some other component's authenticated call came back 401.
    flow.on_session_rejected().await;

    assert_eq!(flow.phase(), AuthPhase::AwaitingPhone);
    assert!(sessions.load().await.is_none());

    // Authenticated-only operations now fail with the session error.
    assert_eq!(
        flow.set_initial_password("abc123", "abc123").await,
        Err(AuthError::SessionExpired)
    );
}
