//! User administration endpoints.

use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{CreateUserRequest, User};
use crate::request::ApiRequest;

pub const CREATE_USER_PATH: &str = "/auth/create_user";

impl ApiClient {
    /// Create a user in the caller's company. Only owners may do this.
    ///
    /// Rejections (not an owner, duplicate email, owner without a company)
    /// become [`ApiError::Validation`] carrying the server's message.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        let request_body = ApiRequest::post(CREATE_USER_PATH).with_json(request)?;
        let user: User = self
            .execute_json(request_body)
            .await
            .map_err(ApiError::into_validation)?;
        user.validate()?;
        info!(user_id = user.id, role = %request.role, "Created user");
        Ok(user)
    }
}
