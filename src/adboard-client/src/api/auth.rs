//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::client::{ApiClient, decode_json};
use crate::error::{ApiError, Result};
use crate::models::{RegisterRequest, TokenPayload, TokenResponse, User};
use crate::request::ApiRequest;

pub const TOKEN_PATH: &str = "/auth/token";
pub const ME_PATH: &str = "/auth/me";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";

impl ApiClient {
    /// Exchange email and password for an access token.
    ///
    /// Rejected credentials surface as [`ApiError::Authentication`] and never
    /// start a token refresh. The token is returned, not stored.
    pub async fn exchange_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenResponse> {
        let request = ApiRequest::post(TOKEN_PATH)
            .with_form(vec![
                ("username".to_string(), email.to_string()),
                ("password".to_string(), password.expose_secret().to_string()),
            ])
            .without_auth_recovery();

        let response = self
            .execute(request)
            .await
            .map_err(ApiError::into_authentication)?;
        let payload: TokenPayload = decode_json(response).await?;
        let token = TokenResponse::try_from(payload)?;
        info!(email, "Credentials accepted");
        Ok(token)
    }

    /// Fetch the user the stored access token belongs to.
    pub async fn current_user(&self) -> Result<User> {
        let user: User = self.execute_json(ApiRequest::get(ME_PATH)).await?;
        user.validate()?;
        debug!(user_id = user.id, role = %user.role, "Fetched current user");
        Ok(user)
    }

    /// Create an account. Server-side rejections become [`ApiError::Validation`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let request = ApiRequest::post(REGISTER_PATH)
            .with_json(request)?
            .without_auth_recovery();
        let user: User = self
            .execute_json(request)
            .await
            .map_err(ApiError::into_validation)?;
        user.validate()?;
        info!(user_id = user.id, "Account registered");
        Ok(user)
    }

    /// Ask the server to revoke the refresh credential.
    ///
    /// The server answers by clearing the refresh cookie, which removes the
    /// stored copy.
    pub async fn revoke_session(&self) -> Result<()> {
        let request = ApiRequest::post(LOGOUT_PATH).without_auth_recovery();
        self.execute(request).await?;
        debug!("Refresh credential revoked");
        Ok(())
    }
}
