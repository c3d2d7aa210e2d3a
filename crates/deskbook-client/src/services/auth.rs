use deskbook_core::{SignInRequest, SignUpRequest, TokenResponse, User, UserEdit};
use deskbook_core::models::VerifyRequest;
use serde::{Deserialize, Serialize};

use super::RawBody;
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// Answer of `/api/user/sign-up`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Register; a returned token signs the new user in
    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<SignUpResponse> {
        let response: SignUpResponse = self.api.post_public("/api/user/sign-up", request).await?;
        if let Some(token) = response.token.as_deref() {
            self.api.session().sign_in(token);
        }
        Ok(response)
    }

    /// Exchange credentials for a token and store it in the session
    pub async fn sign_in(&self, request: &SignInRequest) -> ApiResult<()> {
        let response: TokenResponse = self.api.post_public("/api/user/sign-in", request).await?;
        self.api.session().sign_in(&response.token);
        tracing::debug!("Signed in");
        Ok(())
    }

    /// Local only: the backend keeps no session state
    pub fn logout(&self) {
        self.api.session().teardown();
    }

    /// Current user, cached for the next start
    pub async fn me(&self) -> ApiResult<User> {
        let user: User = self.api.get("/api/user/me").await?;
        self.api.session().cache_user(user.clone());
        Ok(user)
    }

    /// Partial profile update; an empty edit is rejected without a request
    pub async fn edit_user(&self, id: &str, edit: &UserEdit) -> ApiResult<RawBody> {
        if edit.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        self.api.put(&format!("/api/user/edit/{}", id), edit).await
    }

    pub async fn verify_email(&self, token: &str) -> ApiResult<RawBody> {
        let body = VerifyRequest {
            token: token.to_string(),
        };
        self.api.post("/api/user/verify", &body).await
    }
}
