//! HTTP client for the MaidMatch API.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use mm_core::errors::{AuthError, TransportError};
use mm_core::session::{SessionRejectionObserver, SessionStore};
use mm_shared::config::ApiClientConfig;

/// Whether a request carries the current session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Unauthenticated endpoint (login, registration)
    Public,
    /// Authenticated endpoint; a 401 means the session is no longer valid
    Bearer,
}

/// Thin wrapper around `reqwest::Client` that knows the API base URL,
/// bounds every call with the configured timeouts, attaches the bearer
/// token of the current session, and converts upstream credential
/// rejections into forced-logout notifications.
///
/// This is the single client for all MaidMatch API traffic, so the token
/// attachment and the 401 handling live in exactly one place.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
    rejection_observer: RwLock<Option<Arc<dyn SessionRejectionObserver>>>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(
        config: &ApiClientConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url_trimmed().to_string(),
            sessions,
            rejection_observer: RwLock::new(None),
        })
    }

    /// Register the receiver for credential-rejection notifications.
    ///
    /// Set after construction because the authentication flow that receives
    /// the notifications is itself built on top of this client.
    pub fn set_rejection_observer(&self, observer: Arc<dyn SessionRejectionObserver>) {
        *self
            .rejection_observer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(observer);
    }

    /// POST a JSON body.
    pub async fn post_json<B>(&self, path: &str, body: &B, auth: Auth) -> Result<Response, AuthError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.http.post(self.url(path)).json(body);
        self.execute(path, builder, auth).await
    }

    /// POST a multipart form (registration payloads with attachments).
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        auth: Auth,
    ) -> Result<Response, AuthError> {
        let builder = self.http.post(self.url(path)).multipart(form);
        self.execute(path, builder, auth).await
    }

    /// POST with an empty body (e.g. logout).
    pub async fn post_empty(&self, path: &str, auth: Auth) -> Result<Response, AuthError> {
        let builder = self.http.post(self.url(path));
        self.execute(path, builder, auth).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(
        &self,
        path: &str,
        builder: RequestBuilder,
        auth: Auth,
    ) -> Result<Response, AuthError> {
        let builder = match auth {
            Auth::Public => builder,
            Auth::Bearer => match self.sessions.load().await {
                Some(session) => builder.bearer_auth(session.access_token),
                None => builder,
            },
        };

        debug!(%path, "issuing API request");
        let response = builder.send().await.map_err(map_transport_error)?;

        if auth == Auth::Bearer && response.status() == StatusCode::UNAUTHORIZED {
            warn!(%path, "authenticated request rejected; session no longer valid");
            self.notify_session_rejected().await;
            return Err(AuthError::SessionExpired);
        }

        Ok(response)
    }

    async fn notify_session_rejected(&self) {
        let observer = self
            .rejection_observer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(observer) = observer {
            observer.on_session_rejected().await;
        }
    }
}

/// Map a transport-level failure onto the error taxonomy. Timeouts get
/// their distinguished reason; everything else is a generic network error.
pub(crate) fn map_transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        TransportError::Timeout.into()
    } else if err.is_decode() {
        TransportError::MalformedResponse(err.to_string()).into()
    } else {
        TransportError::Network(err.to_string()).into()
    }
}
