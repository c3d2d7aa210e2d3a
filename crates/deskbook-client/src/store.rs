//! Application store: the signed-in user and their bookings

use deskbook_core::models::QrCode;
use deskbook_core::{Booking, BookingUpdate, SignInRequest, SignUpRequest, User};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserSlice {
    pub user: Option<User>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingSlice {
    pub meetings: Vec<Booking>,
    pub qr: Option<QrCode>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

/// Record the outcome of an async action in a slice's status and error
fn settle<T>(status: &mut LoadStatus, error: &mut Option<String>, result: &ApiResult<T>) {
    match result {
        Ok(_) => {
            *status = LoadStatus::Succeeded;
            *error = None;
        }
        Err(err) => {
            *status = LoadStatus::Failed;
            *error = Some(err.user_message());
        }
    }
}

pub struct AppStore {
    api: ApiClient,
    user: UserSlice,
    booking: BookingSlice,
}

impl AppStore {
    /// Seed from the session cache so a reload shows the last known data
    pub fn new(api: ApiClient) -> Self {
        let session = api.session();
        let user = UserSlice {
            user: session.user(),
            ..Default::default()
        };
        let booking = BookingSlice {
            meetings: session.cached_meetings(),
            ..Default::default()
        };
        Self { api, user, booking }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> &UserSlice {
        &self.user
    }

    pub fn booking(&self) -> &BookingSlice {
        &self.booking
    }

    // ========== User actions ==========

    /// Sign in, then load the profile
    pub async fn login(&mut self, credentials: &SignInRequest) -> ApiResult<()> {
        self.user.status = LoadStatus::Loading;
        let result = match self.api.auth().sign_in(credentials).await {
            Ok(()) => self.api.auth().me().await,
            Err(err) => Err(err),
        };
        self.finish_user(result)
    }

    pub async fn register(&mut self, request: &SignUpRequest) -> ApiResult<()> {
        self.user.status = LoadStatus::Loading;
        let result = self
            .api
            .auth()
            .sign_up(request)
            .await
            .and_then(|response| {
                response
                    .user
                    .ok_or_else(|| ApiError::Validation("Sign-up returned no user".to_string()))
            });
        self.finish_user(result)
    }

    pub fn logout(&mut self) {
        self.api.auth().logout();
        self.user = UserSlice::default();
        self.booking = BookingSlice::default();
    }

    pub async fn fetch_user(&mut self) -> ApiResult<()> {
        self.user.status = LoadStatus::Loading;
        let result = self.api.auth().me().await;
        self.finish_user(result)
    }

    fn finish_user(&mut self, result: ApiResult<User>) -> ApiResult<()> {
        settle(&mut self.user.status, &mut self.user.error, &result);
        self.user.user = Some(result?);
        Ok(())
    }

    // ========== Booking actions ==========

    pub async fn fetch_meetings(&mut self) -> ApiResult<()> {
        self.booking.status = LoadStatus::Loading;
        let result = self.api.bookings().mine().await;
        self.finish_meetings(result)
    }

    /// Cancel, then reload the list
    pub async fn cancel_meeting(&mut self, uuid: &str) -> ApiResult<()> {
        self.booking.status = LoadStatus::Loading;
        let result = match self.api.bookings().cancel(uuid).await {
            Ok(_) => self.api.bookings().mine().await,
            Err(err) => Err(err),
        };
        self.finish_meetings(result)
    }

    pub async fn update_meeting(&mut self, uuid: &str, update: &BookingUpdate) -> ApiResult<()> {
        self.booking.status = LoadStatus::Loading;
        let result = self.api.bookings().update(uuid, update).await;
        settle(&mut self.booking.status, &mut self.booking.error, &result);
        result.map(|_| ())
    }

    pub async fn fetch_qr(&mut self, uuid: &str) -> ApiResult<()> {
        self.booking.status = LoadStatus::Loading;
        let result = self.api.bookings().qr(uuid).await;
        settle(&mut self.booking.status, &mut self.booking.error, &result);
        self.booking.qr = Some(result?);
        Ok(())
    }

    fn finish_meetings(&mut self, result: ApiResult<Vec<Booking>>) -> ApiResult<()> {
        settle(&mut self.booking.status, &mut self.booking.error, &result);
        self.booking.meetings = result?;
        Ok(())
    }
}
