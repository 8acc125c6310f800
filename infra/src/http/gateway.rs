//! `AuthGateway` implementation against the MaidMatch accounts API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;

use mm_core::domain::value_objects::AuthPayload;
use mm_core::errors::{AuthError, RegistrationError, TransportError};
use mm_core::gateway::{AuthGateway, RegistrationRequest, SetPasswordRequest};

use super::client::{map_transport_error, ApiClient, Auth};
use super::dto::{AuthResponseDto, SendPinRequest, SetPasswordBody, VerifyPinRequest};
use super::error_body::normalize_error_body;

const SEND_PIN_PATH: &str = "/accounts/login/send-pin/";
const VERIFY_PIN_PATH: &str = "/accounts/login/verify-pin/";
const REGISTER_PATH: &str = "/accounts/register/";
const SET_PASSWORD_PATH: &str = "/accounts/users/set_initial_password/";
const LOGOUT_PATH: &str = "/accounts/logout/";

/// HTTP implementation of the remote authentication service.
pub struct HttpAuthGateway {
    client: Arc<ApiClient>,
}

impl HttpAuthGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Turn a non-2xx response into the normalized rejection.
    async fn rejection_from(response: Response) -> AuthError {
        let status = response.status();
        match response.bytes().await {
            Ok(body) => normalize_error_body(status, &body).into(),
            Err(err) => map_transport_error(err),
        }
    }

    /// Parse a 2xx response body, mapping decode failures onto the
    /// transport taxonomy.
    async fn success_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
        response.json::<T>().await.map_err(map_transport_error)
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn send_login_pin(&self, phone_number: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post_json(SEND_PIN_PATH, &SendPinRequest { phone_number }, Auth::Public)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection_from(response).await)
        }
    }

    async fn verify_login_pin(
        &self,
        phone_number: &str,
        pin: &str,
    ) -> Result<AuthPayload, AuthError> {
        let response = self
            .client
            .post_json(
                VERIFY_PIN_PATH,
                &VerifyPinRequest { phone_number, pin },
                Auth::Public,
            )
            .await?;

        if response.status().is_success() {
            let dto: AuthResponseDto = Self::success_json(response).await?;
            Ok(dto.into())
        } else {
            Err(Self::rejection_from(response).await)
        }
    }

    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<AuthPayload, RegistrationError> {
        let mut form = Form::new();
        for (name, value) in request.fields {
            form = form.text(name, value);
        }
        for attachment in request.attachments {
            let part = Part::bytes(attachment.bytes)
                .file_name(attachment.file_name)
                .mime_str(&attachment.content_type)
                .map_err(|err| {
                    AuthError::from(TransportError::Network(format!(
                        "invalid attachment content type: {err}"
                    )))
                })?;
            form = form.part(attachment.field_name, part);
        }

        let response = self
            .client
            .post_multipart(REGISTER_PATH, form, Auth::Public)
            .await?;

        if response.status().is_success() {
            let dto: AuthResponseDto = Self::success_json(response).await?;
            return Ok(dto.into());
        }

        // Registration failures are usually field-scoped; keep the map
        // intact when the backend provided one.
        let rejection = match Self::rejection_from(response).await {
            AuthError::Rejected(rejection) => rejection,
            other => return Err(other.into()),
        };
        match rejection.field_errors {
            Some(fields) => Err(RegistrationError::Fields(fields)),
            None => Err(AuthError::from(rejection).into()),
        }
    }

    async fn set_initial_password(&self, request: SetPasswordRequest) -> Result<(), AuthError> {
        let body = SetPasswordBody {
            old_password: &request.old_password,
            new_password: &request.new_password,
            new_password2: &request.new_password2,
        };
        let response = self
            .client
            .post_json(SET_PASSWORD_PATH, &body, Auth::Bearer)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection_from(response).await)
        }
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let response = self.client.post_empty(LOGOUT_PATH, Auth::Bearer).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection_from(response).await)
        }
    }
}
