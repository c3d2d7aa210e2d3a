use deskbook_core::models::{CheckQrRequest, QrCode, StatusAck};
use deskbook_core::{Booking, BookingRequest, BookingUpdate};

use super::RawBody;
use crate::error::ApiResult;
use crate::http::ApiClient;

pub struct BookingService<'a> {
    api: &'a ApiClient,
}

impl<'a> BookingService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &BookingRequest) -> ApiResult<RawBody> {
        self.api.post("/api/booking/create", request).await
    }

    /// The signed-in user's bookings, cached in the session storage
    pub async fn mine(&self) -> ApiResult<Vec<Booking>> {
        let meetings: Vec<Booking> = self.api.get("/api/booking/user").await?;
        self.api.session().cache_meetings(&meetings);
        Ok(meetings)
    }

    pub async fn cancel(&self, uuid: &str) -> ApiResult<StatusAck> {
        self.api
            .post_empty(&format!("/api/booking/{}/cancel", uuid))
            .await
    }

    /// Move a booking; the window goes both in the body and the query string
    pub async fn update(&self, uuid: &str, update: &BookingUpdate) -> ApiResult<RawBody> {
        self.api
            .post_with_query(&format!("/api/booking/{}/update", uuid), update, update)
            .await
    }

    pub async fn qr(&self, uuid: &str) -> ApiResult<QrCode> {
        self.api.get(&format!("/api/booking/{}/qr", uuid)).await
    }

    /// Validate a scanned QR token; answers with the booking it belongs to
    pub async fn check_qr(&self, code: &str) -> ApiResult<RawBody> {
        let body = CheckQrRequest {
            qr_code: code.to_string(),
        };
        self.api.post("/api/booking/qr/check", &body).await
    }
}
