//! Async driver of the booking page

use async_trait::async_trait;
use deskbook_core::state::{FreePlacesQuery, LocalNow, RequestTicket};
use deskbook_core::{BookingConfig, BookingPageState, BookingRequest, DeskbookError, FreePlace};

use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::services::RawBody;

/// The two calls the booking page makes
#[async_trait(?Send)]
pub trait PlaceApi {
    async fn free_places(&self, query: &FreePlacesQuery) -> ApiResult<Vec<FreePlace>>;
    async fn create_booking(&self, request: &BookingRequest) -> ApiResult<RawBody>;
}

#[async_trait(?Send)]
impl PlaceApi for ApiClient {
    async fn free_places(&self, query: &FreePlacesQuery) -> ApiResult<Vec<FreePlace>> {
        self.places().free(query).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> ApiResult<RawBody> {
        self.bookings().create(request).await
    }
}

/// Booking page state plus the network calls it triggers
pub struct BookingPage<A: PlaceApi> {
    api: A,
    state: BookingPageState,
}

impl<A: PlaceApi> BookingPage<A> {
    pub fn new(api: A, config: BookingConfig, now: LocalNow) -> Self {
        Self {
            api,
            state: BookingPageState::new(config, now),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &BookingPageState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BookingPageState {
        &mut self.state
    }

    /// Fetch the seat list for the current window right away
    pub async fn refresh(&mut self) -> bool {
        let (ticket, query) = self.state.refresh_query();
        self.fetch(ticket, query).await
    }

    /// Drive timers: popover transitions and the debounced fetch.
    ///
    /// Returns whether a fresh seat list was applied.
    pub async fn tick(&mut self, now_ms: u64) -> bool {
        self.state.advance(now_ms);
        match self.state.poll_query(now_ms) {
            Some((ticket, query)) => self.fetch(ticket, query).await,
            None => false,
        }
    }

    /// Failures keep the previous seat list; there is no retry
    async fn fetch(&mut self, ticket: RequestTicket, query: FreePlacesQuery) -> bool {
        match self.api.free_places(&query).await {
            Ok(free) => {
                let applied = self.state.apply_free_places(ticket, &free);
                if !applied {
                    tracing::debug!(ticket = ticket.value(), "Dropped stale free-place answer");
                }
                applied
            }
            Err(err) => {
                tracing::warn!("Error fetching places {}..{}: {}", query.start, query.end, err);
                false
            }
        }
    }

    /// Book the seat in the open popover.
    ///
    /// On success the seat list is refetched before the confirmation toast;
    /// on failure the server's message goes to both the popover and a toast
    /// and the error is returned.
    pub async fn book(&mut self, now_ms: u64) -> ApiResult<RawBody> {
        let request = self.state.begin_booking().ok_or_else(|| {
            DeskbookError::BookingRefused("no bookable seat selected".to_string())
        })?;

        match self.api.create_booking(&request).await {
            Ok(created) => {
                tracing::info!("Booked {} {}..{}", request.name, request.start_at, request.end_at);
                self.refresh().await;
                self.state.booking_succeeded(now_ms);
                Ok(created)
            }
            Err(err) => {
                tracing::warn!("Booking {} failed: {}", request.name, err);
                self.state.booking_failed(&err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use chrono::NaiveDate;
    use deskbook_core::state::{PopoverPhase, RequestStatus};
    use deskbook_core::{TimeOfDay, ToastKind};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakePlaces {
        free: RefCell<Vec<Vec<FreePlace>>>,
        fail_fetch: bool,
        booking_error: Option<(u16, String)>,
        queries: RefCell<Vec<FreePlacesQuery>>,
        bookings: RefCell<Vec<BookingRequest>>,
    }

    #[async_trait(?Send)]
    impl PlaceApi for FakePlaces {
        async fn free_places(&self, query: &FreePlacesQuery) -> ApiResult<Vec<FreePlace>> {
            self.queries.borrow_mut().push(query.clone());
            if self.fail_fetch {
                return Err(ApiError::Server {
                    status: 500,
                    message: "down".into(),
                });
            }
            let mut answers = self.free.borrow_mut();
            Ok(if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers.first().cloned().unwrap_or_default()
            })
        }

        async fn create_booking(&self, request: &BookingRequest) -> ApiResult<RawBody> {
            self.bookings.borrow_mut().push(request.clone());
            match &self.booking_error {
                Some((status, body)) => Err(ApiError::from_status(*status, body)),
                None => Ok(serde_json::json!({ "status": true })),
            }
        }
    }

    fn free(names: &[&str]) -> Vec<FreePlace> {
        names.iter().map(|n| FreePlace::new(*n)).collect()
    }

    fn now(ms: u64) -> LocalNow {
        LocalNow::new(
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            TimeOfDay::new(9, 7),
            ms,
        )
    }

    fn page(api: FakePlaces) -> BookingPage<FakePlaces> {
        BookingPage::new(api, BookingConfig::default(), now(0))
    }

    // Fetch tests
    #[tokio::test]
    async fn test_refresh_applies_free_places() {
        let api = FakePlaces {
            free: RefCell::new(vec![free(&["A1", "A2"])]),
            ..Default::default()
        };
        let mut page = page(api);
        assert!(page.refresh().await);
        assert_eq!(page.state().floor_plan().free_count(), 2);
        assert_eq!(
            page.api().queries.borrow()[0],
            FreePlacesQuery {
                start: "2025-03-07T09:15:00".into(),
                end: "2025-03-07T10:15:00".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_previous_plan() {
        let api = FakePlaces {
            free: RefCell::new(vec![free(&["B1"])]),
            ..Default::default()
        };
        let mut page = page(api);
        page.refresh().await;
        page.api.fail_fetch = true;

        assert!(!page.refresh().await);
        assert_eq!(page.state().floor_plan().free_count(), 1);
        assert!(page.state().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_tick_fetches_after_debounce() {
        let mut page = page(FakePlaces::default());
        page.refresh().await;
        let range = deskbook_core::TimeRange::new(TimeOfDay::new(12, 0), TimeOfDay::new(13, 0));
        page.state_mut().set_range(range, now(100));

        assert!(!page.tick(400).await);
        assert_eq!(page.api().queries.borrow().len(), 1);
        assert!(page.tick(600).await);
        assert_eq!(page.api().queries.borrow()[1].start, "2025-03-07T12:00:00");
    }

    // Booking tests
    async fn open_popover(page: &mut BookingPage<FakePlaces>) {
        page.refresh().await;
        page.state_mut().click_seat("D4", false, 1_000).unwrap();
        page.tick(1_010).await;
    }

    #[tokio::test]
    async fn test_book_success_refetches_and_toasts() {
        let api = FakePlaces {
            free: RefCell::new(vec![free(&["D4", "D5"]), free(&["D5"])]),
            ..Default::default()
        };
        let mut page = page(api);
        open_popover(&mut page).await;

        page.book(2_000).await.unwrap();
        assert_eq!(page.api().bookings.borrow()[0].name, "D4");
        assert!(page.state().floor_plan().is_occupied("D4").unwrap());
        assert_eq!(page.state().toasts.latest().unwrap().kind, ToastKind::Success);
        assert_eq!(
            page.state().popover().unwrap().status(),
            RequestStatus::Success
        );
    }

    #[tokio::test]
    async fn test_book_conflict_surfaces_payload() {
        let api = FakePlaces {
            free: RefCell::new(vec![free(&["D4"])]),
            booking_error: Some((409, r#"{"message":"Seat already booked"}"#.into())),
            ..Default::default()
        };
        let mut page = page(api);
        open_popover(&mut page).await;

        let err = page.book(2_000).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        let toast = page.state().toasts.latest().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Seat already booked");
        assert_eq!(page.state().popover().unwrap().error(), Some("Seat already booked"));

        page.tick(30_000).await;
        assert_eq!(page.state().popover().unwrap().phase(), PopoverPhase::Open);
    }

    #[tokio::test]
    async fn test_book_without_popover_is_refused() {
        let mut page = page(FakePlaces::default());
        let err = page.book(0).await.unwrap_err();
        assert!(matches!(err, ApiError::Core(DeskbookError::BookingRefused(_))));
        assert!(page.api().bookings.borrow().is_empty());
    }
}
