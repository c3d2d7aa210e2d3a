use reqwest::{Method, StatusCode};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// Liveness check that doubles as a token check
pub struct PingService<'a> {
    api: &'a ApiClient,
}

impl<'a> PingService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Anything but a 200 clears the session; callers then redirect to sign-in
    pub async fn pong(&self) -> ApiResult<()> {
        match self.api.probe(Method::GET, "/api/pong").await {
            Ok(StatusCode::OK) => Ok(()),
            Ok(status) => {
                tracing::warn!(status = status.as_u16(), "Ping rejected");
                self.api.session().teardown();
                Err(ApiError::Unauthorized)
            }
            Err(err) => {
                tracing::warn!("Ping failed: {}", err);
                self.api.session().teardown();
                Err(ApiError::Unauthorized)
            }
        }
    }
}
