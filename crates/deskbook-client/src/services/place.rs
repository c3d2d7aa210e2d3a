use deskbook_core::state::FreePlacesQuery;
use deskbook_core::{Booking, FreePlace, Place};

use crate::error::ApiResult;
use crate::http::ApiClient;

pub struct PlaceService<'a> {
    api: &'a ApiClient,
}

impl<'a> PlaceService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Seats free for the whole interval
    pub async fn free(&self, query: &FreePlacesQuery) -> ApiResult<Vec<FreePlace>> {
        self.api.get_query("/api/place/free", query).await
    }

    /// Place detail; best-effort, failures are logged and yield `None`
    pub async fn get(&self, name: &str) -> ApiResult<Option<Place>> {
        match self.api.get(&format!("/api/place/{}", name)).await {
            Ok(place) => Ok(Some(place)),
            Err(err) if err.is_session_error() => Err(err),
            Err(err) => {
                tracing::warn!("Place {} unavailable: {}", name, err);
                Ok(None)
            }
        }
    }

    /// Every booking of one seat (admin view)
    pub async fn bookings_for(&self, name: &str) -> ApiResult<Vec<Booking>> {
        self.api.get(&format!("/api/booking/{}/place", name)).await
    }
}
