//! Identity surface of the remote API.

use reqwest::header::ACCEPT;
use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use crate::session::{AuthPayload, IdentityGateway, RegistrationForm, UserProfile};

use super::types::{AuthPayloadDto, UserDto};
use super::{ApiClient, ApiError, handle_response};

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a `{token, user}` payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` on bad credentials, or a
    /// validation error with field messages.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/login"))
            .header(ACCEPT, "application/json")
            .json(&LoginBody { email, password })
            .send()
            .await?;

        let payload: AuthPayloadDto = handle_response(response).await?;
        Ok(into_auth_payload(payload))
    }

    /// Register a new account. The avatar, when present, is sent as a
    /// multipart file part alongside the text fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error with field messages when the form is
    /// rejected.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ApiError> {
        let mut body = multipart::Form::new()
            .text("username", form.username.clone())
            .text("email", form.email.clone())
            .text("password", form.password.clone())
            .text("password_confirmation", form.password_confirmation.clone());

        if let Some(avatar) = &form.avatar {
            let part =
                multipart::Part::bytes(avatar.content.clone()).file_name(avatar.file_name.clone());
            body = body.part("avatar", part);
        }

        let response = self
            .inner
            .http
            .post(self.endpoint("/register"))
            .header(ACCEPT, "application/json")
            .multipart(body)
            .send()
            .await?;

        let payload: AuthPayloadDto = handle_response(response).await?;
        Ok(into_auth_payload(payload))
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &SecretString) -> Result<UserProfile, ApiError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/user"))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let user: UserDto = handle_response(response).await?;
        Ok(user.into_profile())
    }
}

fn into_auth_payload(dto: AuthPayloadDto) -> AuthPayload {
    AuthPayload {
        token: SecretString::from(dto.token),
        user: dto.user.into_profile(),
    }
}

impl IdentityGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        Self::login(self, email, password).await
    }

    async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ApiError> {
        Self::register(self, form).await
    }
}
