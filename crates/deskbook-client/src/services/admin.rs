use deskbook_core::User;
use reqwest::{Method, StatusCode};

use super::RawBody;
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// Admin probe and user control
pub struct AdminService<'a> {
    api: &'a ApiClient,
}

impl<'a> AdminService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Authorization check: 200 means admin, 401/403 mean not
    pub async fn is_admin(&self) -> ApiResult<bool> {
        match self.api.probe(Method::POST, "/api/admin-only").await? {
            StatusCode::OK => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => Err(ApiError::from_status(status.as_u16(), "")),
        }
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        self.api.get("/api/user/all").await
    }

    pub async fn verify_user(&self, id: &str) -> ApiResult<RawBody> {
        self.api
            .post(
                &format!("/api/user/verify/{}", id),
                &serde_json::json!({ "verified": true }),
            )
            .await
    }

    pub async fn block_user(&self, id: &str) -> ApiResult<RawBody> {
        self.api.post_empty(&format!("/api/user/block/{}", id)).await
    }

    pub async fn unblock_user(&self, id: &str) -> ApiResult<RawBody> {
        self.api.post_empty(&format!("/api/user/unblock/{}", id)).await
    }

    pub async fn delete_user(&self, id: &str) -> ApiResult<RawBody> {
        self.api.delete(&format!("/api/user/delete/{}", id)).await
    }
}
