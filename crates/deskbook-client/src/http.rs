//! HTTP client for the booking backend

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::{AdminService, AuthService, BookingService, PingService, PlaceService, TicketService};
use crate::session::SessionHandle;

/// Bearer-authenticated JSON client shared by every service
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> ApiResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ========== Services ==========

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self)
    }

    pub fn places(&self) -> PlaceService<'_> {
        PlaceService::new(self)
    }

    pub fn bookings(&self) -> BookingService<'_> {
        BookingService::new(self)
    }

    pub fn tickets(&self) -> TicketService<'_> {
        TicketService::new(self)
    }

    pub fn ping(&self) -> PingService<'_> {
        PingService::new(self)
    }

    // ========== Requests ==========

    /// Attach the session token; fails without sending when there is none
    fn authorized(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.session.token().ok_or(ApiError::MissingToken)?;
        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.authorized(Method::GET, path)?;
        self.send(request).await
    }

    pub async fn get_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        let request = self.authorized(Method::GET, path)?.query(query);
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.authorized(Method::POST, path)?.json(body);
        self.send(request).await
    }

    pub async fn post_with_query<T, Q, B>(&self, path: &str, query: &Q, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let request = self.authorized(Method::POST, path)?.query(query).json(body);
        self.send(request).await
    }

    /// POST with an empty `{}` body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.post(path, &serde_json::json!({})).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.authorized(Method::PUT, path)?.json(body);
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.authorized(Method::DELETE, path)?;
        self.send(request).await
    }

    /// POST without a token (sign-up, sign-in)
    pub async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(request).await
    }

    /// Send an authenticated request and report only its status
    pub async fn probe(&self, method: Method, path: &str) -> ApiResult<StatusCode> {
        let mut request = self.authorized(method.clone(), path)?;
        if method == Method::POST {
            request = request.json(&serde_json::json!({}));
        }
        let response = request.send().await?;
        Ok(response.status())
    }

    /// Execute and decode; a 401 anywhere clears the session
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &text);
            if matches!(err, ApiError::Unauthorized) {
                tracing::warn!("Token rejected, clearing session");
                self.session.teardown();
            } else {
                tracing::debug!(status = status.as_u16(), "Request failed: {}", err);
            }
            return Err(err);
        }

        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(Into::into)
    }
}
